use std::fmt;
use std::io::Read;

use crate::errors::{Error, Result};
use crate::source::BodyReader;
use crate::util;

/// A multi precision integer in wire representation: a 16 bit big endian
/// bit count followed by the big endian magnitude.
/// Ref: https://tools.ietf.org/html/rfc4880.html#section-3.2
#[derive(Clone, PartialEq, Eq)]
pub struct Mpi {
    bits: u16,
    data: Vec<u8>,
}

impl Mpi {
    /// Reads one MPI from a packet body. The body reader accounts for the
    /// consumed octets (length prefix included), so the caller's remaining
    /// length shrinks accordingly.
    pub(crate) fn read<R: Read>(body: &mut BodyReader<'_, R>) -> Result<Mpi> {
        let bits = body.read_u16()?;
        let nbytes = (usize::from(bits) + 7) / 8;
        if let Some(remaining) = body.remaining() {
            if nbytes > remaining as usize {
                warn!("mpi of {} bits larger than remaining packet", bits);
                return Err(Error::InvalidMpi);
            }
        }
        let data = body.take(nbytes).map_err(|_| Error::InvalidMpi)?;

        Ok(Mpi { bits, data })
    }

    pub fn from_raw(bits: u16, data: Vec<u8>) -> Mpi {
        Mpi { bits, data }
    }

    /// Declared length in bits.
    pub fn bits(&self) -> u16 {
        self.bits
    }

    /// Big endian magnitude bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Mpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if util::mpi_print_mode() {
            write!(f, "[{} bits] {}", self.bits, hex::encode(&self.data))
        } else {
            write!(f, "[{} bits]", self.bits)
        }
    }
}

impl fmt::Debug for Mpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mpi({} bits, {})", self.bits, hex::encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::source::{BodyLen, PacketSource};

    #[test]
    fn test_mpi_read() {
        // 13 bits -> 2 bytes of magnitude
        let raw = vec![0x00, 0x0d, 0x1f, 0xff, 0xaa];
        let mut src = PacketSource::new(Cursor::new(raw));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(5));
        let mpi = Mpi::read(&mut body).unwrap();
        assert_eq!(mpi.bits(), 13);
        assert_eq!(mpi.as_bytes(), &[0x1f, 0xff]);
        assert_eq!(body.remaining(), Some(1));
    }

    #[test]
    fn test_mpi_larger_than_packet() {
        let raw = vec![0x01, 0x00, 0x01];
        let mut src = PacketSource::new(Cursor::new(raw));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(3));
        assert!(Mpi::read(&mut body).is_err());
    }

    #[test]
    fn test_mpi_truncated_prefix() {
        let raw = vec![0x00];
        let mut src = PacketSource::new(Cursor::new(raw));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(1));
        assert!(Mpi::read(&mut body).is_err());
    }
}
