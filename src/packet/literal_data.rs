use std::io::Read;

use chrono::{DateTime, TimeZone, Utc};

use num_traits::FromPrimitive;

use crate::errors::{Error, Result};
use crate::source::BodyReader;
use crate::types::Tag;
use crate::util::{escape_for_list, read_string_lossy};

/// Literal Data Packet.
///
/// Only the leading fields are materialized; the payload stays in the
/// source, positioned right after the timestamp, and belongs to the
/// caller. `len` is the payload length for definite length packets and
/// `None` when the body is framed with an indeterminate or partial
/// length.
/// https://tools.ietf.org/html/rfc4880.html#section-5.9
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LiteralData {
    mode: u8,
    file_name: String,
    created_at: u32,
    len: Option<u32>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum DataMode {
    Binary = b'b',
    Text = b't',
    Utf8 = b'u',
    Mime = b'm',
}

impl LiteralData {
    pub fn mode(&self) -> u8 {
        self.mode
    }

    pub fn data_mode(&self) -> Option<DataMode> {
        DataMode::from_u8(self.mode)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn created_at(&self) -> u32 {
        self.created_at
    }

    pub fn created(&self) -> DateTime<Utc> {
        Utc.timestamp(i64::from(self.created_at), 0)
    }

    /// Length of the payload still sitting in the source, if known.
    pub fn data_len(&self) -> Option<u32> {
        self.len
    }
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>) -> Result<LiteralData> {
    if let Some(pktlen) = body.remaining() {
        if pktlen < 6 {
            warn!("packet({}) too short ({})", Tag::LiteralData as u8, pktlen);
            return Err(Error::PacketTooShort {
                tag: Tag::LiteralData as u8,
            });
        }
    }
    let mode = body.get_or_fail()?;
    let namelen = usize::from(body.get_or_fail()?);

    let mut name = Vec::with_capacity(namelen);
    match body.remaining() {
        Some(_) => {
            // keep the four timestamp octets out of the name
            while name.len() < namelen && body.remaining().unwrap_or(0) > 4 {
                name.push(body.get_or_fail()?);
            }
        }
        None => {
            for _ in 0..namelen {
                match body.get()? {
                    Some(byte) => name.push(byte),
                    None => break,
                }
            }
        }
    }
    let created_at = body.read_u32()?;
    let len = body.remaining();

    let literal = LiteralData {
        mode,
        file_name: read_string_lossy(&name),
        created_at,
        len,
    };
    list_line!(
        ":literal data packet: mode {}, created {}, name=\"{}\", raw data: {} bytes",
        if mode >= b' ' && mode < b'z' {
            (mode as char).to_string()
        } else {
            "?".to_string()
        },
        created_at,
        escape_for_list(&name),
        len.map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );

    Ok(literal)
}
