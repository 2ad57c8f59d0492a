use std::io::Read;

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::source::BodyReader;
use crate::types::{KeyId, Mpi, Tag};

/// The algorithm specific session key ciphertext.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum EncryptedSessionKey {
    Elgamal { a: Mpi, b: Mpi },
    Rsa { integer: Mpi },
    /// Ciphertext of an algorithm this implementation does not know; the
    /// bytes were skipped.
    Unknown,
}

/// Public-Key Encrypted Session Key Packet.
/// https://tools.ietf.org/html/rfc4880.html#section-5.1
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublicKeyEncryptedSessionKey {
    version: u8,
    key_id: KeyId,
    algorithm: u8,
    values: EncryptedSessionKey,
}

impl PublicKeyEncryptedSessionKey {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn values(&self) -> &EncryptedSessionKey {
        &self.values
    }
}

pub(crate) fn parse<R: Read>(
    body: &mut BodyReader<'_, R>,
) -> Result<PublicKeyEncryptedSessionKey> {
    let tag = Tag::PublicKeyEncryptedSessionKey as u8;
    if body.remaining().unwrap_or(0) < 12 {
        warn!("packet({}) too short", tag);
        return Err(Error::PacketTooShort { tag });
    }
    let version = body.get_or_fail()?;
    if version != 2 && version != 3 {
        warn!("packet({}) with unknown version {}", tag, version);
        return Err(Error::UnknownVersion { tag, version });
    }
    let key_id = KeyId::from_slice(&body.take(8)?)?;
    let algorithm = body.get_or_fail()?;
    list_line!(
        ":pubkey enc packet: version {}, algo {}, keyid {}",
        version,
        algorithm,
        key_id
    );

    let values = if PublicKeyAlgorithm::is_elgamal(algorithm) {
        let a = Mpi::read(body)?;
        let b = Mpi::read(body)?;
        list_line!("\telg a: {}", a);
        list_line!("\telg b: {}", b);
        EncryptedSessionKey::Elgamal { a, b }
    } else if PublicKeyAlgorithm::is_rsa(algorithm) {
        let integer = Mpi::read(body)?;
        list_line!("\trsa integer: {}", integer);
        EncryptedSessionKey::Rsa { integer }
    } else {
        list_line!("\tunknown algorithm {}", algorithm);
        EncryptedSessionKey::Unknown
    };

    Ok(PublicKeyEncryptedSessionKey {
        version,
        key_id,
        algorithm,
        values,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::source::{BodyLen, PacketSource};

    fn parse_body(raw: Vec<u8>) -> Result<PublicKeyEncryptedSessionKey> {
        let len = raw.len() as u32;
        let mut src = PacketSource::new(Cursor::new(raw));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(len));
        parse(&mut body)
    }

    #[test]
    fn test_rsa_session_key() {
        let mut raw = vec![3];
        raw.extend(&[1, 2, 3, 4, 5, 6, 7, 8]);
        raw.push(1); // RSA
        raw.extend(&[0x00, 0x09, 0x01, 0xff]);
        let pkesk = parse_body(raw).unwrap();
        assert_eq!(pkesk.version(), 3);
        assert_eq!(pkesk.key_id().as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        match pkesk.values() {
            EncryptedSessionKey::Rsa { integer } => {
                assert_eq!(integer.bits(), 9);
                assert_eq!(integer.as_bytes(), &[0x01, 0xff]);
            }
            other => panic!("unexpected values: {:?}", other),
        }
    }

    #[test]
    fn test_elgamal_session_key() {
        let mut raw = vec![2];
        raw.extend(&[8, 7, 6, 5, 4, 3, 2, 1]);
        raw.push(16); // Elgamal
        raw.extend(&[0x00, 0x02, 0x03]);
        raw.extend(&[0x00, 0x01, 0x01]);
        let pkesk = parse_body(raw).unwrap();
        match pkesk.values() {
            EncryptedSessionKey::Elgamal { a, b } => {
                assert_eq!(a.as_bytes(), &[0x03]);
                assert_eq!(b.as_bytes(), &[0x01]);
            }
            other => panic!("unexpected values: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_algorithm() {
        let mut raw = vec![3];
        raw.extend(&[0; 8]);
        raw.push(99);
        raw.extend(&[0xde, 0xad]);
        let pkesk = parse_body(raw).unwrap();
        assert_eq!(pkesk.values(), &EncryptedSessionKey::Unknown);
    }

    #[test]
    fn test_too_short() {
        assert!(parse_body(vec![3, 1, 2, 3]).is_err());
    }
}
