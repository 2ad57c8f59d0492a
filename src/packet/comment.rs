use std::io::Read;

use crate::errors::Result;
use crate::source::BodyReader;
use crate::types::Tag;
use crate::util::{escape_for_list, read_string_lossy};

/// Comment packet, covering both the draft comment tag and the private
/// comment tag written by early GnuPG versions.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Comment {
    data: Vec<u8>,
}

impl Comment {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn text(&self) -> String {
        read_string_lossy(&self.data)
    }

    pub(crate) fn from_bytes(data: Vec<u8>) -> Comment {
        Comment { data }
    }
}

pub(crate) fn parse<R: Read>(body: &mut BodyReader<'_, R>, tag: Tag) -> Result<Comment> {
    let data = body.take_rest()?;
    list_line!(
        ":{}comment packet: \"{}\"",
        if tag == Tag::OldComment {
            "OpenPGP draft "
        } else {
            ""
        },
        escape_for_list(&data)
    );

    Ok(Comment { data })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::source::{BodyLen, PacketSource};

    #[test]
    fn test_comment() {
        let mut src = PacketSource::new(Cursor::new(b"a note".to_vec()));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(6));
        let comment = parse(&mut body, Tag::Comment).unwrap();
        assert_eq!(comment.text(), "a note");
    }
}
