use std::io::Read;

use smallvec::SmallVec;

use num_traits::FromPrimitive;

use crate::errors::{Error, Result};
use crate::source::PacketSource;
use crate::types::{PacketHeader, PacketLength, Tag, Version};

fn length_byte<R: Read>(
    src: &mut PacketSource<R>,
    raw: &mut SmallVec<[u8; 6]>,
) -> Result<u8> {
    match src.get()? {
        Some(byte) => {
            raw.push(byte);
            Ok(byte)
        }
        None => {
            warn!("{}: length byte missing", src.location());
            Err(Error::InvalidPacket("header truncated in length field".into()))
        }
    }
}

/// Reads one packet header from the source. `Ok(None)` means the stream is
/// cleanly exhausted (no more packets). As a side effect the source is
/// switched into block or partial mode when the length encoding asks for
/// it, so the following body reads see exactly the packet's bytes.
// Ref: https://tools.ietf.org/html/rfc4880.html#section-4.2
pub(crate) fn read_packet_header<R: Read>(
    src: &mut PacketSource<R>,
) -> Result<Option<PacketHeader>> {
    let ctb = match src.get()? {
        Some(ctb) => ctb,
        None => return Ok(None),
    };
    let mut raw = SmallVec::<[u8; 6]>::new();
    raw.push(ctb);

    if ctb & 0x80 == 0 {
        warn!("{}: invalid packet (ctb=0x{:02x})", src.location(), ctb);
        return Err(Error::InvalidHeader {
            ctb,
            offset: src.tell() - 1,
        });
    }

    let header = if ctb & 0x40 != 0 {
        // New format
        let tag = ctb & 0x3f;
        let first = length_byte(src, &mut raw)?;
        let length = match first {
            // One-Octet Lengths
            0..=191 => PacketLength::Fixed(u32::from(first)),
            // Two-Octet Lengths
            192..=223 => {
                let second = length_byte(src, &mut raw)?;
                PacketLength::Fixed(((u32::from(first) - 192) << 8) + u32::from(second) + 192)
            }
            // Partial Body Lengths
            224..=254 => {
                let chunk = 1u32 << (first - 224);
                debug!("partial body, first chunk of {} bytes", chunk);
                src.set_partial_block_mode(chunk);
                PacketLength::Partial
            }
            // Five-Octet Lengths
            255 => {
                let mut len = 0u32;
                for _ in 0..4 {
                    len = (len << 8) | u32::from(length_byte(src, &mut raw)?);
                }
                PacketLength::Fixed(len)
            }
        };
        PacketHeader::new(Version::New, tag, length, raw)
    } else {
        // Old format
        let tag = (ctb >> 2) & 0x0f;
        let length = match ctb & 3 {
            3 => {
                // Indeterminate length: the body runs to the end of the
                // stream. Compressed packets read the stream themselves,
                // everything else goes through block mode.
                if Tag::from_u8(tag) != Some(Tag::CompressedData) {
                    src.set_block_mode(true);
                }
                PacketLength::Indeterminated
            }
            lentype => {
                let lenbytes = 1usize << lentype;
                let mut len = 0u32;
                for _ in 0..lenbytes {
                    len = (len << 8) | u32::from(length_byte(src, &mut raw)?);
                }
                PacketLength::Fixed(len)
            }
        };
        PacketHeader::new(Version::Old, tag, length, raw)
    };

    Ok(Some(header))
}
