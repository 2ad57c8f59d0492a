use std::io::Read;

use crate::errors::Result;
use crate::source::BodyReader;

/// Ring trust packet. Not part of the wire format proper, only found in
/// key ring files; the flag byte is captured for diagnostics.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Trust {
    flag: u8,
}

impl Trust {
    pub fn flag(&self) -> u8 {
        self.flag
    }
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>) -> Result<Trust> {
    let flag = body.get_or_fail()?;
    list_line!(":trust packet: flag={:02x}", flag);

    Ok(Trust { flag })
}
