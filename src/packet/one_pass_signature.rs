use std::io::Read;

use crate::errors::{Error, Result};
use crate::source::BodyReader;
use crate::types::{KeyId, Tag};

/// One-Pass Signature Packet.
/// https://tools.ietf.org/html/rfc4880.html#section-5.4
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct OnePassSignature {
    version: u8,
    sig_class: u8,
    digest_algo: u8,
    pubkey_algo: u8,
    key_id: KeyId,
    last: u8,
}

impl OnePassSignature {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn sig_class(&self) -> u8 {
        self.sig_class
    }

    pub fn digest_algo(&self) -> u8 {
        self.digest_algo
    }

    pub fn pubkey_algo(&self) -> u8 {
        self.pubkey_algo
    }

    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// Nonzero when this is the last one-pass header before the data.
    pub fn is_last(&self) -> bool {
        self.last != 0
    }
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>) -> Result<OnePassSignature> {
    let tag = Tag::OnePassSignature as u8;
    if body.remaining().unwrap_or(0) < 13 {
        warn!("packet({}) too short", tag);
        return Err(Error::PacketTooShort { tag });
    }
    let version = body.get_or_fail()?;
    if version != 3 {
        warn!("onepass_sig with unknown version {}", version);
        return Err(Error::UnknownVersion { tag, version });
    }
    let sig_class = body.get_or_fail()?;
    let digest_algo = body.get_or_fail()?;
    let pubkey_algo = body.get_or_fail()?;
    let key_id = KeyId::from_slice(&body.take(8)?)?;
    let last = body.get_or_fail()?;

    list_line!(
        ":onepass_sig packet: keyid {}, version {}, sigclass {:02x}, digest {}, pubkey {}, last={}",
        key_id,
        version,
        sig_class,
        digest_algo,
        pubkey_algo,
        last
    );

    Ok(OnePassSignature {
        version,
        sig_class,
        digest_algo,
        pubkey_algo,
        key_id,
        last,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::source::{BodyLen, PacketSource};

    #[test]
    fn test_one_pass_signature() {
        let mut raw = vec![3, 0x00, 2, 17];
        raw.extend(&[1, 2, 3, 4, 5, 6, 7, 8]);
        raw.push(1);
        let len = raw.len() as u32;
        let mut src = PacketSource::new(Cursor::new(raw));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(len));
        let ops = parse(&mut body).unwrap();
        assert_eq!(ops.sig_class(), 0);
        assert_eq!(ops.digest_algo(), 2);
        assert_eq!(ops.pubkey_algo(), 17);
        assert!(ops.is_last());
    }

    #[test]
    fn test_one_pass_signature_bad_version() {
        let raw = vec![4, 0, 2, 17, 1, 2, 3, 4, 5, 6, 7, 8, 1];
        let mut src = PacketSource::new(Cursor::new(raw));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(13));
        assert!(parse(&mut body).is_err());
    }
}
