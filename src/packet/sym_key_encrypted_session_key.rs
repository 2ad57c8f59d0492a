use std::io::Read;

use num_traits::FromPrimitive;

use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::{Error, Result};
use crate::source::BodyReader;
use crate::types::{read_s2k, StringToKey, Tag};

/// Symmetric-Key Encrypted Session Key Packet.
/// https://tools.ietf.org/html/rfc4880.html#section-5.3
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SymKeyEncryptedSessionKey {
    version: u8,
    cipher_algo: u8,
    s2k: StringToKey,
    session_key: Vec<u8>,
}

impl SymKeyEncryptedSessionKey {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn cipher_algo(&self) -> u8 {
        self.cipher_algo
    }

    pub fn cipher_algorithm(&self) -> Option<SymmetricKeyAlgorithm> {
        SymmetricKeyAlgorithm::from_u8(self.cipher_algo)
    }

    pub fn s2k(&self) -> &StringToKey {
        &self.s2k
    }

    /// Encrypted session key, empty when the session key is derived
    /// directly from the passphrase.
    pub fn session_key(&self) -> &[u8] {
        &self.session_key
    }
}

pub(crate) fn parse<R: Read>(
    body: &mut BodyReader<'_, R>,
) -> Result<SymKeyEncryptedSessionKey> {
    let tag = Tag::SymKeyEncryptedSessionKey as u8;
    let pktlen = body.remaining().unwrap_or(0);
    if pktlen < 4 {
        warn!("packet({}) too short", tag);
        return Err(Error::PacketTooShort { tag });
    }
    let version = body.get_or_fail()?;
    if version != 4 {
        warn!("packet({}) with unknown version {}", tag, version);
        return Err(Error::UnknownVersion { tag, version });
    }
    // the session key length has to fit in one octet downstream
    if body.remaining().unwrap_or(0) > 200 {
        warn!("packet({}) too large", tag);
        return Err(Error::InvalidPacket("session key packet too large".into()));
    }
    let cipher_algo = body.get_or_fail()?;
    let s2k_mode = body.get_or_fail()?;
    let hash_algo = body.get_or_fail()?;

    let minlen = match s2k_mode {
        0 => 0,
        1 => 8,
        4 => 12,
        _ => {
            warn!("unknown S2K {}", s2k_mode);
            // the rest of the body cannot be interpreted; it is skipped
            // by the dispatcher
            return Ok(SymKeyEncryptedSessionKey {
                version,
                cipher_algo,
                s2k: StringToKey::Unknown {
                    mode: s2k_mode,
                    hash_algo,
                },
                session_key: Vec::new(),
            });
        }
    };
    let rest = body.remaining().unwrap_or(0) as usize;
    if rest < minlen {
        warn!("packet with S2K {} too short", s2k_mode);
        return Err(Error::PacketTooShort { tag });
    }
    let seskeylen = rest - minlen;
    let s2k = read_s2k(body, s2k_mode, hash_algo)?;
    let session_key = body.take(seskeylen)?;

    list_line!(
        ":symkey enc packet: version {}, cipher {}, s2k {}, hash {}",
        version,
        cipher_algo,
        s2k_mode,
        hash_algo
    );
    if let Some(salt) = s2k.salt() {
        list_line!("\tsalt {}", hex::encode(salt));
    }
    if let Some(count) = s2k.count() {
        list_line!("\tcount {}", count);
    }

    Ok(SymKeyEncryptedSessionKey {
        version,
        cipher_algo,
        s2k,
        session_key,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::source::{BodyLen, PacketSource};

    fn parse_body(raw: Vec<u8>) -> Result<SymKeyEncryptedSessionKey> {
        let len = raw.len() as u32;
        let mut src = PacketSource::new(Cursor::new(raw));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(len));
        parse(&mut body)
    }

    #[test]
    fn test_simple_s2k_without_session_key() {
        let skesk = parse_body(vec![4, 9, 0, 2]).unwrap();
        assert_eq!(skesk.cipher_algorithm(), Some(SymmetricKeyAlgorithm::AES256));
        assert_eq!(skesk.s2k().mode(), 0);
        assert!(skesk.session_key().is_empty());
    }

    #[test]
    fn test_salted_s2k_with_session_key() {
        let mut raw = vec![4, 7, 1, 2];
        raw.extend(&[1, 2, 3, 4, 5, 6, 7, 8]);
        raw.extend(&[0xaa, 0xbb, 0xcc]);
        let skesk = parse_body(raw).unwrap();
        assert_eq!(skesk.s2k().salt(), Some(&[1u8, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(skesk.session_key(), &[0xaa, 0xbb, 0xcc][..]);
    }

    #[test]
    fn test_iterated_s2k() {
        let mut raw = vec![4, 7, 4, 2];
        raw.extend(&[8, 7, 6, 5, 4, 3, 2, 1]);
        raw.extend(&[0x00, 0x00, 0x10, 0x00]);
        let skesk = parse_body(raw).unwrap();
        assert_eq!(skesk.s2k().count(), Some(4096));
        assert!(skesk.session_key().is_empty());
    }

    #[test]
    fn test_unknown_s2k_mode_is_marked() {
        let skesk = parse_body(vec![4, 7, 3, 2, 0xff]).unwrap();
        assert_eq!(skesk.s2k().mode(), 3);
        assert!(skesk.session_key().is_empty());
    }

    #[test]
    fn test_unknown_version() {
        assert!(parse_body(vec![5, 7, 0, 2]).is_err());
    }

    #[test]
    fn test_too_short() {
        assert!(parse_body(vec![4, 7]).is_err());
    }
}
