use std::io::Read;

use crate::errors::Result;
use crate::source::BodyReader;
use crate::util::{escape_for_list, read_string_lossy};

/// User ID Packet
/// https://tools.ietf.org/html/rfc4880.html#section-5.11
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UserId {
    data: Vec<u8>,
}

impl UserId {
    /// The raw user id bytes as found on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The user id as text (lossy for non UTF-8 ids).
    pub fn id(&self) -> String {
        read_string_lossy(&self.data)
    }
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>) -> Result<UserId> {
    let data = body.take_rest()?;
    list_line!(":user id packet: \"{}\"", escape_for_list(&data));

    Ok(UserId { data })
}
