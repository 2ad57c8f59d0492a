use std::io::Read;

use crate::errors::{Error, Result};
use crate::source::BodyReader;
use crate::types::Tag;

/// Symmetrically Encrypted Data Packet.
///
/// The ciphertext is not materialized; it stays in the source for the
/// decryption layer. `len` is the remaining body length for definite
/// length packets (the leading ten octets of a definite body are the CFB
/// random prefix).
/// https://tools.ietf.org/html/rfc4880.html#section-5.7
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SymEncryptedData {
    len: Option<u32>,
}

impl SymEncryptedData {
    /// Length of the ciphertext left in the source, if known.
    pub fn data_len(&self) -> Option<u32> {
        self.len
    }
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>) -> Result<SymEncryptedData> {
    if let Some(pktlen) = body.remaining() {
        if pktlen < 10 {
            warn!("packet({}) too short", Tag::SymEncryptedData as u8);
            return Err(Error::PacketTooShort {
                tag: Tag::SymEncryptedData as u8,
            });
        }
        list_line!(":encrypted data packet: length: {}", pktlen - 10);
    } else {
        list_line!(":encrypted data packet: length: unknown");
    }

    Ok(SymEncryptedData {
        len: body.remaining(),
    })
}
