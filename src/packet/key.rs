use std::io::Read;

use chrono::{DateTime, TimeZone, Utc};

use num_traits::FromPrimitive;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::packet::comment::Comment;
use crate::packet::packet_sum::Packet;
use crate::source::BodyReader;
use crate::types::{
    read_s2k, KeyProtection, KeyVersion, Mpi, PacketHeader, StringToKey, Tag,
};
use crate::util::escape_for_list;

/// The public parameters for the different algorithms.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PublicParams {
    Rsa {
        n: Mpi,
        e: Mpi,
    },
    Dsa {
        p: Mpi,
        q: Mpi,
        g: Mpi,
        y: Mpi,
    },
    Elgamal {
        p: Mpi,
        g: Mpi,
        y: Mpi,
    },
    /// Parameters of an algorithm this implementation does not know; the
    /// bytes were skipped.
    Unknown,
}

/// The secret parameters for the different algorithms. When the key is
/// protected these MPIs hold ciphertext.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SecretParams {
    Rsa { d: Mpi, p: Mpi, q: Mpi, u: Mpi },
    Dsa { x: Mpi },
    Elgamal { x: Mpi },
    Unknown,
}

/// The fields shared by all four key packet flavors.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KeyDetails {
    version: KeyVersion,
    created_at: u32,
    expiration: Option<u16>,
    algorithm: u8,
    public_params: PublicParams,
    header: PacketHeader,
}

impl KeyDetails {
    pub fn version(&self) -> KeyVersion {
        self.version
    }

    pub fn created_at(&self) -> u32 {
        self.created_at
    }

    pub fn created(&self) -> DateTime<Utc> {
        Utc.timestamp(i64::from(self.created_at), 0)
    }

    /// Validity period in days; only carried by v2/v3 keys.
    pub fn expiration(&self) -> Option<u16> {
        self.expiration
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn public_key_algorithm(&self) -> Option<PublicKeyAlgorithm> {
        PublicKeyAlgorithm::from_u8(self.algorithm)
    }

    pub fn public_params(&self) -> &PublicParams {
        &self.public_params
    }

    /// The packet header exactly as read from the stream; fingerprinting
    /// hashes it together with the body.
    pub fn header(&self) -> &PacketHeader {
        &self.header
    }
}

/// The secret half shared by secret key and secret subkey packets.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SecretKeyDetails {
    details: KeyDetails,
    protection: Option<KeyProtection>,
    secret_params: SecretParams,
    checksum: Option<u16>,
}

impl SecretKeyDetails {
    pub fn details(&self) -> &KeyDetails {
        &self.details
    }

    pub fn is_protected(&self) -> bool {
        self.protection.is_some()
    }

    pub fn protection(&self) -> Option<&KeyProtection> {
        self.protection.as_ref()
    }

    pub fn secret_params(&self) -> &SecretParams {
        &self.secret_params
    }

    pub fn checksum(&self) -> Option<u16> {
        self.checksum
    }
}

macro_rules! impl_public_key {
    ($name:ident) => {
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub struct $name(pub(crate) KeyDetails);

        impl $name {
            pub fn details(&self) -> &KeyDetails {
                &self.0
            }
        }
    };
}

macro_rules! impl_secret_key {
    ($name:ident) => {
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub struct $name(pub(crate) SecretKeyDetails);

        impl $name {
            pub fn details(&self) -> &KeyDetails {
                self.0.details()
            }

            pub fn secret(&self) -> &SecretKeyDetails {
                &self.0
            }
        }
    };
}

impl_public_key!(PublicKey);
impl_public_key!(PublicSubkey);
impl_secret_key!(SecretKey);
impl_secret_key!(SecretSubkey);

fn is_secret(tag: Tag) -> bool {
    tag == Tag::SecretKey || tag == Tag::SecretSubkey
}

fn list_name(tag: Tag) -> &'static str {
    match tag {
        Tag::PublicKey => "public",
        Tag::SecretKey => "secret",
        Tag::PublicSubkey => "public sub",
        Tag::SecretSubkey => "secret sub",
        _ => "??",
    }
}

/// Reads the protection fields of a secret key: the protection algorithm
/// octet, an explicit S2K when that octet is 255, and the 8 octet IV. A
/// nonzero legacy value (anything but 0 and 255) has no S2K on the wire,
/// a simple mode 0 specifier is fabricated for it; the hash is MD5 except
/// for Elgamal keys protected with Blowfish-160, which used RIPEMD-160.
fn read_protection<R: Read>(
    body: &mut BodyReader<'_, R>,
    algorithm: u8,
) -> Result<Option<KeyProtection>> {
    let protect_algo = body.get_or_fail()?;
    if protect_algo == 0 {
        return Ok(None);
    }

    let (cipher_algo, s2k) = if protect_algo == 255 {
        ensure!(
            body.remaining().unwrap_or(0) >= 3,
            "truncated S2K specifier"
        );
        let cipher_algo = body.get_or_fail()?;
        let s2k_mode = body.get_or_fail()?;
        let hash_algo = body.get_or_fail()?;
        let s2k = read_s2k(body, s2k_mode, hash_algo)?;
        match s2k {
            StringToKey::Simple { .. } => list_line!("\tsimple S2K"),
            StringToKey::Salted { .. } => list_line!("\tsalted S2K"),
            StringToKey::IteratedSalted { .. } => list_line!("\titer+salt S2K"),
            StringToKey::Unknown { mode, .. } => {
                list_line!("\tunknown S2K {}", mode);
                return Err(Error::InvalidPacket(format!("unknown S2K mode {}", mode)));
            }
        }
        list_line!("\talgo: {}, hash: {}", cipher_algo, hash_algo);
        if let Some(salt) = s2k.salt() {
            list_line!("\tsalt: {}", hex::encode(salt));
        }
        (cipher_algo, s2k)
    } else {
        list_line!("\tprotect algo: {}", protect_algo);
        // old versions have no S2K, so one is faked
        let hash_algo = if PublicKeyAlgorithm::is_elgamal(algorithm)
            && protect_algo == SymmetricKeyAlgorithm::Blowfish160 as u8
        {
            HashAlgorithm::RIPEMD160 as u8
        } else {
            HashAlgorithm::MD5 as u8
        };
        (protect_algo, StringToKey::Simple { hash_algo })
    };

    ensure!(body.remaining().unwrap_or(0) >= 8, "truncated protection IV");
    let mut iv = [0u8; 8];
    for slot in iv.iter_mut() {
        *slot = body.get_or_fail()?;
    }
    list_line!("\tprotect IV: {}", hex::encode(&iv));

    Ok(Some(KeyProtection {
        cipher_algo,
        s2k,
        iv,
    }))
}

fn read_secret_half<R: Read>(
    body: &mut BodyReader<'_, R>,
    details: KeyDetails,
) -> Result<SecretKeyDetails> {
    if let PublicParams::Unknown = details.public_params {
        // nothing about the secret half can be interpreted either
        return Ok(SecretKeyDetails {
            details,
            protection: None,
            secret_params: SecretParams::Unknown,
            checksum: None,
        });
    }
    let protection = read_protection(body, details.algorithm)?;

    let secret_params = match details.public_params {
        PublicParams::Elgamal { .. } => {
            let x = Mpi::read(body)?;
            list_line!("\telg x: {}", x);
            SecretParams::Elgamal { x }
        }
        PublicParams::Dsa { .. } => {
            let x = Mpi::read(body)?;
            SecretParams::Dsa { x }
        }
        PublicParams::Rsa { .. } => {
            let d = Mpi::read(body)?;
            let p = Mpi::read(body)?;
            let q = Mpi::read(body)?;
            let u = Mpi::read(body)?;
            SecretParams::Rsa { d, p, q, u }
        }
        PublicParams::Unknown => unreachable!("handled above"),
    };
    let checksum = body.read_u16()?;
    list_line!("\tchecksum: {:04x}", checksum);

    Ok(SecretKeyDetails {
        details,
        protection,
        secret_params,
        checksum: Some(checksum),
    })
}

pub(crate) fn parse<R: Read>(
    body: &mut BodyReader<'_, R>,
    tag: Tag,
    header: &PacketHeader,
) -> Result<Packet> {
    let tag_raw = tag as u8;
    let version_raw = body.get_or_fail()?;

    if tag == Tag::PublicSubkey && version_raw == b'#' {
        // early versions of G10 reused this slot for old style comment
        // packets; all of those start with a hash character
        let data = body.take_rest()?;
        list_line!(":rfc1991 comment packet: \"{}\"", escape_for_list(&data));
        return Ok(Packet::Comment(Comment::from_bytes(data)));
    }

    let version = KeyVersion::from_u8(version_raw).ok_or_else(|| {
        warn!("packet({}) with unknown version {}", tag_raw, version_raw);
        Error::UnknownVersion {
            tag: tag_raw,
            version: version_raw,
        }
    })?;
    let is_v4 = version == KeyVersion::V4;

    if body.remaining().unwrap_or(0) < 11 {
        warn!("packet({}) too short", tag_raw);
        return Err(Error::PacketTooShort { tag: tag_raw });
    }

    let created_at = body.read_u32()?;
    let expiration = if is_v4 { None } else { Some(body.read_u16()?) };
    let algorithm = body.get_or_fail()?;
    list_line!(
        ":{} key packet: version {}, algo {}, created {}, valid for {} days",
        list_name(tag),
        version_raw,
        algorithm,
        created_at,
        expiration.unwrap_or(0)
    );

    let public_params = if PublicKeyAlgorithm::is_elgamal(algorithm) {
        let p = Mpi::read(body)?;
        let g = Mpi::read(body)?;
        let y = Mpi::read(body)?;
        list_line!("\telg p: {}", p);
        list_line!("\telg g: {}", g);
        list_line!("\telg y: {}", y);
        PublicParams::Elgamal { p, g, y }
    } else if PublicKeyAlgorithm::is_dsa(algorithm) {
        let p = Mpi::read(body)?;
        let q = Mpi::read(body)?;
        let g = Mpi::read(body)?;
        let y = Mpi::read(body)?;
        list_line!("\tdsa p: {}", p);
        list_line!("\tdsa q: {}", q);
        list_line!("\tdsa g: {}", g);
        list_line!("\tdsa y: {}", y);
        PublicParams::Dsa { p, q, g, y }
    } else if PublicKeyAlgorithm::is_rsa(algorithm) {
        let n = Mpi::read(body)?;
        let e = Mpi::read(body)?;
        list_line!("\tpublic modulus  n: {}", n);
        list_line!("\tpublic exponent e: {}", e);
        PublicParams::Rsa { n, e }
    } else {
        list_line!("\tunknown algorithm {}", algorithm);
        PublicParams::Unknown
    };

    let details = KeyDetails {
        version,
        created_at,
        expiration,
        algorithm,
        public_params,
        header: header.clone(),
    };

    let packet = if is_secret(tag) {
        let secret = read_secret_half(body, details)?;
        if tag == Tag::SecretKey {
            Packet::SecretKey(SecretKey(secret))
        } else {
            Packet::SecretSubkey(SecretSubkey(secret))
        }
    } else if tag == Tag::PublicKey {
        Packet::PublicKey(PublicKey(details))
    } else {
        Packet::PublicSubkey(PublicSubkey(details))
    };

    Ok(packet)
}
