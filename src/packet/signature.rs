use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, TimeZone, Utc};

use num_traits::FromPrimitive;

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::packet::subpacket::{SubpacketArea, SubpacketType};
use crate::source::BodyReader;
use crate::types::{KeyId, Mpi, SignatureVersion, Tag};
use crate::util;

/// The algorithm specific signature values.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SignatureValues {
    Elgamal { a: Mpi, b: Mpi },
    Dsa { r: Mpi, s: Mpi },
    Rsa { integer: Mpi },
    /// Values of an algorithm this implementation does not know; the
    /// bytes were skipped.
    Unknown,
}

/// Signature Packet.
/// https://tools.ietf.org/html/rfc4880.html#section-5.2
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Signature {
    version: SignatureVersion,
    sig_class: u8,
    timestamp: Option<u32>,
    key_id: Option<KeyId>,
    md5_len: u8,
    pubkey_algo: u8,
    digest_algo: u8,
    hashed: Option<SubpacketArea>,
    unhashed: Option<SubpacketArea>,
    digest_start: [u8; 2],
    values: SignatureValues,
}

impl Signature {
    pub fn version(&self) -> SignatureVersion {
        self.version
    }

    pub fn sig_class(&self) -> u8 {
        self.sig_class
    }

    /// Creation time. For v4 signatures this is extracted from the hashed
    /// area and may be absent.
    pub fn timestamp(&self) -> Option<u32> {
        self.timestamp
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.timestamp.map(|ts| Utc.timestamp(i64::from(ts), 0))
    }

    /// Issuer key id. For v4 signatures this is extracted from the
    /// unhashed area and may be absent.
    pub fn key_id(&self) -> Option<&KeyId> {
        self.key_id.as_ref()
    }

    /// The "length of hashed material" octet of v2/v3 signatures. It is
    /// recorded as read; the wire value is always 5.
    pub fn md5_len(&self) -> u8 {
        self.md5_len
    }

    pub fn pubkey_algo(&self) -> u8 {
        self.pubkey_algo
    }

    pub fn digest_algo(&self) -> u8 {
        self.digest_algo
    }

    /// The hashed subpacket area, verbatim including its length prefix.
    pub fn hashed_area(&self) -> Option<&SubpacketArea> {
        self.hashed.as_ref()
    }

    /// The unhashed subpacket area, verbatim including its length prefix.
    pub fn unhashed_area(&self) -> Option<&SubpacketArea> {
        self.unhashed.as_ref()
    }

    /// The left 16 bits of the signed hash value.
    pub fn digest_start(&self) -> &[u8; 2] {
        &self.digest_start
    }

    pub fn values(&self) -> &SignatureValues {
        &self.values
    }
}

fn read_subpacket_area<R: Read>(
    body: &mut BodyReader<'_, R>,
    what: &str,
) -> Result<Option<SubpacketArea>> {
    let len = body.read_u16()?;
    if len > 10_000 {
        warn!("signature packet: {} data too long", what);
        return Err(Error::InvalidPacket(format!(
            "signature {} area too long",
            what
        )));
    }
    if len == 0 {
        return Ok(None);
    }
    let data = body.take(usize::from(len)).map_err(|err| {
        warn!("premature eof while reading {} signature data", what);
        err
    })?;

    Ok(Some(SubpacketArea::new(len, data)))
}

fn read_signature_values<R: Read>(
    body: &mut BodyReader<'_, R>,
    pubkey_algo: u8,
) -> Result<SignatureValues> {
    let values = if PublicKeyAlgorithm::is_elgamal(pubkey_algo) {
        let a = Mpi::read(body)?;
        let b = Mpi::read(body)?;
        list_line!("\telg a: {}", a);
        list_line!("\telg b: {}", b);
        SignatureValues::Elgamal { a, b }
    } else if PublicKeyAlgorithm::is_dsa(pubkey_algo) {
        let r = Mpi::read(body)?;
        let s = Mpi::read(body)?;
        list_line!("\tdsa r: {}", r);
        list_line!("\tdsa s: {}", s);
        SignatureValues::Dsa { r, s }
    } else if PublicKeyAlgorithm::is_rsa(pubkey_algo) {
        let integer = Mpi::read(body)?;
        list_line!("\trsa integer: {}", integer);
        SignatureValues::Rsa { integer }
    } else {
        list_line!("\tunknown algorithm {}", pubkey_algo);
        SignatureValues::Unknown
    };

    Ok(values)
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>) -> Result<Signature> {
    let tag = Tag::Signature as u8;
    if body.remaining().unwrap_or(0) < 16 {
        warn!("packet({}) too short", tag);
        return Err(Error::PacketTooShort { tag });
    }
    let version_raw = body.get_or_fail()?;
    let version = SignatureVersion::from_u8(version_raw).ok_or_else(|| {
        warn!("packet({}) with unknown version {}", tag, version_raw);
        Error::UnknownVersion {
            tag,
            version: version_raw,
        }
    })?;
    let is_v4 = version == SignatureVersion::V4;

    let md5_len = if is_v4 { 0 } else { body.get_or_fail()? };
    let sig_class = body.get_or_fail()?;
    let (mut timestamp, mut key_id) = if is_v4 {
        (None, None)
    } else {
        let ts = body.read_u32()?;
        let id = KeyId::from_slice(&body.take(8)?)?;
        (Some(ts), Some(id))
    };
    let pubkey_algo = body.get_or_fail()?;
    let digest_algo = body.get_or_fail()?;

    let (hashed, unhashed) = if is_v4 {
        let hashed = read_subpacket_area(body, "hashed")?;
        let unhashed = read_subpacket_area(body, "unhashed")?;
        (hashed, unhashed)
    } else {
        (None, None)
    };

    if body.remaining().unwrap_or(0) < 5 {
        warn!("packet({}) too short", tag);
        return Err(Error::PacketTooShort { tag });
    }
    let digest_start = [body.get_or_fail()?, body.get_or_fail()?];

    if is_v4 {
        match hashed
            .as_ref()
            .and_then(|area| area.find(SubpacketType::SignatureCreationTime))
        {
            Some(raw) => timestamp = Some(BigEndian::read_u32(raw)),
            None => warn!("signature packet without timestamp"),
        }
        match unhashed
            .as_ref()
            .and_then(|area| area.find(SubpacketType::Issuer))
        {
            Some(raw) => key_id = Some(KeyId::from_slice(&raw[..8])?),
            None => warn!("signature packet without keyid"),
        }
    }

    list_line!(
        ":signature packet: algo {}, keyid {}",
        pubkey_algo,
        key_id.map_or_else(|| "?".to_string(), |id| id.to_string())
    );
    list_line!(
        "\tversion {}, created {}, md5len {}, sigclass {:02x}",
        version_raw,
        timestamp.unwrap_or(0),
        md5_len,
        sig_class
    );
    list_line!(
        "\tdigest algo {}, begin of digest {:02x} {:02x}",
        digest_algo,
        digest_start[0],
        digest_start[1]
    );
    if util::list_mode() && is_v4 {
        if let Some(ref area) = hashed {
            area.list(true);
        }
        if let Some(ref area) = unhashed {
            area.list(false);
        }
    }

    let values = read_signature_values(body, pubkey_algo)?;

    Ok(Signature {
        version,
        sig_class,
        timestamp,
        key_id,
        md5_len,
        pubkey_algo,
        digest_algo,
        hashed,
        unhashed,
        digest_start,
        values,
    })
}
