use std::io::Read;

use num_traits::FromPrimitive;

use crate::crypto::compression::CompressionAlgorithm;
use crate::errors::Result;
use crate::source::BodyReader;

/// Compressed Data Packet.
///
/// Only the algorithm octet is consumed; the compressed payload is the
/// rest of the body (usually the rest of the stream) and is handed to the
/// decompressor by the caller, reading from the source.
/// https://tools.ietf.org/html/rfc4880.html#section-5.6
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CompressedData {
    algorithm: u8,
    len: Option<u32>,
}

impl CompressedData {
    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn compression_algorithm(&self) -> Option<CompressionAlgorithm> {
        CompressionAlgorithm::from_u8(self.algorithm)
    }

    /// Length of the compressed payload left in the source, if known.
    pub fn data_len(&self) -> Option<u32> {
        self.len
    }
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>) -> Result<CompressedData> {
    let algorithm = body.get_or_fail()?;
    let len = body.remaining();
    list_line!(":compressed packet: algo={}", algorithm);

    Ok(CompressedData { algorithm, len })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::source::{BodyLen, PacketSource};

    #[test]
    fn test_compressed() {
        let mut src = PacketSource::new(Cursor::new(vec![1u8, 0xde, 0xad]));
        let mut body = BodyReader::new(&mut src, BodyLen::Streamed);
        let compressed = parse(&mut body).unwrap();
        assert_eq!(
            compressed.compression_algorithm(),
            Some(CompressionAlgorithm::ZIP)
        );
        assert_eq!(compressed.data_len(), None);
        assert_eq!(src.get().unwrap(), Some(0xde));
    }
}
