use std::cmp;
use std::io::{Read, Write};

use crate::errors::{Error, Result};
use crate::packet::packet_sum::Packet;
use crate::packet::{
    comment, compressed, encrypted, header, key, literal_data, one_pass_signature,
    public_key_encrypted_session_key, signature, sym_key_encrypted_session_key, trust, user_id,
};
use crate::source::{BodyLen, BodyReader, PacketSource};
use crate::types::{PacketHeader, PacketLength, Tag};
use crate::util;

enum Event {
    Packet(Packet),
    Skipped,
    Copied,
}

/// True for the packet types whose payload stays in the source: the
/// caller reads it (or feeds it to the decompression/decryption layer)
/// after the packet record is returned.
fn is_streamed(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::LiteralData | Tag::CompressedData | Tag::SymEncryptedData
    )
}

/// One round of the packet loop: reads a header and then copies, skips or
/// parses the body. `Ok(None)` means the stream is exhausted.
fn parse<R: Read>(
    src: &mut PacketSource<R>,
    reqtype: Option<Tag>,
    retpos: Option<&mut u64>,
    out: Option<&mut dyn Write>,
    do_skip: bool,
) -> Result<Option<Event>> {
    if let Some(pos) = retpos {
        *pos = src.tell();
    }
    let header = match header::read_packet_header(src)? {
        Some(header) => header,
        None => return Ok(None),
    };
    let tag_raw = header.tag_raw();
    let tag = header.tag();

    if tag_raw != 0 {
        if let Some(out) = out {
            out.write_all(header.raw_bytes())?;
            copy_body(src, out, header.length())?;
            return Ok(Some(Event::Copied));
        }
    }

    let wrong_type = reqtype.map_or(false, |want| tag != Some(want));
    if do_skip || tag_raw == 0 || wrong_type {
        skip_packet(src, &header)?;
        return Ok(Some(Event::Skipped));
    }

    let tag = match tag {
        Some(tag) => tag,
        None => {
            debug!("unknown packet type {} at {}", tag_raw, src.location());
            skip_packet(src, &header)?;
            return Ok(Some(Event::Skipped));
        }
    };
    debug!(
        "parse_packet: type={:?} length={:?}{}",
        tag,
        header.length(),
        if header.version() == crate::types::Version::New {
            " (new)"
        } else {
            ""
        }
    );

    parse_body(src, tag, &header).map(|packet| Some(Event::Packet(packet)))
}

fn parse_body<R: Read>(
    src: &mut PacketSource<R>,
    tag: Tag,
    header: &PacketHeader,
) -> Result<Packet> {
    let len = match header.length() {
        PacketLength::Fixed(n) => BodyLen::Definite(n),
        PacketLength::Indeterminated | PacketLength::Partial => BodyLen::Streamed,
    };
    let mut body = BodyReader::new(src, len);
    let res = dispatch(&mut body, tag, header);
    match res {
        // a streamed payload belongs to the caller, the stream stays put
        Ok(packet) if is_streamed(tag) => Ok(packet),
        // everything else realigns at the next packet boundary, on
        // success and on recoverable error alike
        Ok(packet) => {
            body.skip_rest()?;
            Ok(packet)
        }
        Err(err) => {
            body.skip_rest()?;
            Err(err)
        }
    }
}

fn dispatch<R: Read>(
    body: &mut BodyReader<'_, R>,
    tag: Tag,
    header: &PacketHeader,
) -> Result<Packet> {
    match tag {
        Tag::PublicKey | Tag::PublicSubkey | Tag::SecretKey | Tag::SecretSubkey => {
            key::parse(body, tag, header)
        }
        Tag::SymKeyEncryptedSessionKey => {
            sym_key_encrypted_session_key::parse(body).map(Into::into)
        }
        Tag::PublicKeyEncryptedSessionKey => {
            public_key_encrypted_session_key::parse(body).map(Into::into)
        }
        Tag::Signature => signature::parse(body).map(Into::into),
        Tag::OnePassSignature => one_pass_signature::parse(body).map(Into::into),
        Tag::UserId => user_id::parse(body).map(Into::into),
        Tag::OldComment | Tag::Comment => comment::parse(body, tag).map(Into::into),
        Tag::Trust => trust::parse(body).map(Into::into),
        Tag::LiteralData => literal_data::parse(body).map(Into::into),
        Tag::CompressedData => compressed::parse(body).map(Into::into),
        Tag::SymEncryptedData => encrypted::parse(body).map(Into::into),
    }
}

/// Consumes a body that is not going to be parsed, dumping it in list
/// mode, and leaves the source at the next packet boundary.
fn skip_packet<R: Read>(src: &mut PacketSource<R>, header: &PacketHeader) -> Result<()> {
    if util::list_mode() && header.tag_raw() != 0 {
        list_line!(
            ":unknown packet: type {:2}, length {}",
            header.tag_raw(),
            match header.length() {
                PacketLength::Fixed(n) => n.to_string(),
                PacketLength::Indeterminated => "indeterminate".to_string(),
                PacketLength::Partial => "partial".to_string(),
            }
        );
        let len = match header.length() {
            PacketLength::Fixed(n) => BodyLen::Definite(n),
            _ => BodyLen::Streamed,
        };
        let mut body = BodyReader::new(src, len);
        let mut line = Vec::with_capacity(24);
        while let Some(byte) = body.get()? {
            line.push(byte);
            if line.len() == 24 {
                list_line!("dump: {}", hex::encode(&line));
                line.clear();
            }
        }
        if !line.is_empty() {
            list_line!("dump: {}", hex::encode(&line));
        }
        return Ok(());
    }
    skip_body(src, header.length())
}

fn skip_body<R: Read>(src: &mut PacketSource<R>, length: PacketLength) -> Result<()> {
    match length {
        PacketLength::Fixed(n) => src.skip(n),
        PacketLength::Indeterminated | PacketLength::Partial => {
            if src.in_block_mode() {
                src.drain_packet()
            } else {
                // old style compressed body: runs to the end of the stream
                src.drain_to_eof()
            }
        }
    }
}

fn copy_body<R: Read>(
    src: &mut PacketSource<R>,
    out: &mut dyn Write,
    length: PacketLength,
) -> Result<()> {
    let mut buf = [0u8; 4096];
    match length {
        PacketLength::Fixed(mut n) => {
            while n > 0 {
                let want = cmp::min(n as usize, buf.len());
                let got = src.read(&mut buf[..want])?;
                if got == 0 {
                    return Err(Error::UnexpectedEof);
                }
                out.write_all(&buf[..got])?;
                n -= got as u32;
            }
            Ok(())
        }
        PacketLength::Partial => src.copy_partial_raw(out),
        PacketLength::Indeterminated => {
            // block mode stops at the packet end; a compressed body
            // simply runs to the end of the stream
            loop {
                let got = src.read(&mut buf)?;
                if got == 0 {
                    return Ok(());
                }
                out.write_all(&buf[..got])?;
            }
        }
    }
}

/// After a streamed packet was handed out but its payload is not wanted,
/// this consumes the payload so the next packet can be read.
fn drain_streamed<R: Read>(src: &mut PacketSource<R>, len: Option<u32>) -> Result<()> {
    match len {
        Some(n) => src.skip(n),
        None => {
            if src.in_block_mode() {
                src.drain_packet()
            } else {
                src.drain_to_eof()
            }
        }
    }
}

/// Parses the next packet. Skipped packets (unknown types, deleted
/// packets) do not show up; `Ok(None)` means the input is exhausted.
///
/// The payload of literal/compressed/encrypted packets is not consumed:
/// it stays in the source and must be read (or skipped) by the caller
/// before the next call.
pub fn parse_packet<R: Read>(src: &mut PacketSource<R>) -> Result<Option<Packet>> {
    loop {
        match parse(src, None, None, None, false)? {
            None => return Ok(None),
            Some(Event::Packet(packet)) => return Ok(Some(packet)),
            Some(_) => continue,
        }
    }
}

/// Advances through the stream until a packet of the requested type is
/// produced, returning it together with its start offset.
pub fn search_packet<R: Read>(
    src: &mut PacketSource<R>,
    reqtype: Tag,
) -> Result<Option<(Packet, u64)>> {
    let mut pos = 0u64;
    loop {
        match parse(src, Some(reqtype), Some(&mut pos), None, false)? {
            None => return Ok(None),
            Some(Event::Packet(packet)) => return Ok(Some((packet, pos))),
            Some(_) => continue,
        }
    }
}

/// Copies all packets from `src` to `out`, dropping deleted packets
/// (type 0) and normalizing nothing else: known and unknown bodies go
/// through byte identical.
pub fn copy_all_packets<R: Read, W: Write>(src: &mut PacketSource<R>, out: &mut W) -> Result<()> {
    loop {
        match parse(src, None, None, Some(&mut *out as &mut dyn Write), false)? {
            None => return Ok(()),
            Some(_) => continue,
        }
    }
}

/// Like [`copy_all_packets`], but stops in front of the first packet that
/// starts at or past `stopoff`.
pub fn copy_some_packets<R: Read, W: Write>(
    src: &mut PacketSource<R>,
    out: &mut W,
    stopoff: u64,
) -> Result<()> {
    loop {
        if src.tell() >= stopoff {
            return Ok(());
        }
        match parse(src, None, None, Some(&mut *out as &mut dyn Write), false)? {
            None => return Ok(()),
            Some(_) => continue,
        }
    }
}

/// Skips over the next `n` packets.
pub fn skip_some_packets<R: Read>(src: &mut PacketSource<R>, n: usize) -> Result<()> {
    for _ in 0..n {
        if parse(src, None, None, None, true)?.is_none() {
            break;
        }
    }
    Ok(())
}

/// Streaming packet iterator over a reader.
///
/// Recoverable per packet errors (bad body, unknown version) are yielded
/// as `Err` items with the stream already realigned at the next packet
/// boundary, so iteration can continue.
pub struct PacketParser<R> {
    src: PacketSource<R>,
}

impl<R: Read> PacketParser<R> {
    pub fn new(input: R) -> Self {
        PacketParser {
            src: PacketSource::new(input),
        }
    }

    pub fn source(&self) -> &PacketSource<R> {
        &self.src
    }

    /// Access to the source, e.g. to read a streamed payload after its
    /// packet record was returned.
    pub fn source_mut(&mut self) -> &mut PacketSource<R> {
        &mut self.src
    }

    pub fn into_inner(self) -> R {
        self.src.into_inner()
    }
}

impl<R: Read> Iterator for PacketParser<R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match parse(&mut self.src, None, None, None, false) {
                Ok(None) => return None,
                Ok(Some(Event::Packet(packet))) => return Some(Ok(packet)),
                Ok(Some(_)) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Parse packets from the given reader into a list, in a streaming
/// fashion. Packets with invalid bodies are skipped with a warning;
/// streamed payloads are drained and discarded, so this is for looking at
/// packet structure, not for extracting literal data.
pub fn parser(input: impl Read) -> Result<Vec<Packet>> {
    let mut src = PacketSource::new(input);
    let mut packets = Vec::new();
    loop {
        match parse_packet(&mut src) {
            Ok(Some(packet)) => {
                info!("-- parsed packet {:?} --", packet.tag());
                let streamed_len = match packet {
                    Packet::LiteralData(ref p) => Some(p.data_len()),
                    Packet::CompressedData(ref p) => Some(p.data_len()),
                    Packet::SymEncryptedData(ref p) => Some(p.data_len()),
                    _ => None,
                };
                if let Some(len) = streamed_len {
                    drain_streamed(&mut src, len)?;
                }
                packets.push(packet);
            }
            Ok(None) => break,
            Err(Error::Io(err)) => return Err(Error::Io(err)),
            Err(err) => {
                // for now we are simply skipping invalid packets
                warn!("parse error: {:?}", err);
            }
        }
    }
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    fn source_of(data: Vec<u8>) -> PacketSource<Cursor<Vec<u8>>> {
        PacketSource::new(Cursor::new(data))
    }

    #[test]
    fn test_empty_input() {
        let mut src = source_of(Vec::new());
        assert!(parse_packet(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_old_format_user_id() {
        let mut src = source_of(hex!("b4 05 48 65 6c 6c 6f").to_vec());
        let packet = parse_packet(&mut src).unwrap().unwrap();
        match packet {
            Packet::UserId(ref id) => assert_eq!(id.id(), "Hello"),
            ref other => panic!("unexpected packet: {:?}", other),
        }
        assert!(parse_packet(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_new_format_user_id() {
        let mut src = source_of(hex!("cd 05 77 6f 72 6c 64").to_vec());
        let packet = parse_packet(&mut src).unwrap().unwrap();
        match packet {
            Packet::UserId(ref id) => assert_eq!(id.id(), "world"),
            ref other => panic!("unexpected packet: {:?}", other),
        }
    }

    #[test]
    fn test_new_format_two_octet_length() {
        let mut data = hex!("cd c0 00").to_vec();
        data.extend(std::iter::repeat(b'x').take(192));
        let mut src = source_of(data);
        let packet = parse_packet(&mut src).unwrap().unwrap();
        match packet {
            Packet::UserId(ref id) => assert_eq!(id.as_bytes().len(), 192),
            ref other => panic!("unexpected packet: {:?}", other),
        }
        assert!(parse_packet(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_offset_accounting() {
        // two user id packets back to back
        let data = hex!("b4 05 48 65 6c 6c 6f cd 05 77 6f 72 6c 64").to_vec();
        let mut src = source_of(data);
        assert_eq!(src.tell(), 0);
        parse_packet(&mut src).unwrap().unwrap();
        // 2 header octets plus 5 body octets
        assert_eq!(src.tell(), 7);
        parse_packet(&mut src).unwrap().unwrap();
        assert_eq!(src.tell(), 14);
    }

    #[test]
    fn test_indeterminate_compressed() {
        // old format compressed packet, length type 3, empty payload
        let mut src = source_of(vec![0xa3, 0x01]);
        let packet = parse_packet(&mut src).unwrap().unwrap();
        match packet {
            Packet::CompressedData(ref p) => {
                assert_eq!(p.algorithm(), 1);
                assert_eq!(p.data_len(), None);
            }
            ref other => panic!("unexpected packet: {:?}", other),
        }
        assert!(parse_packet(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_partial_body_literal() {
        // new format literal data packet, first chunk 0xe3 = 8 octets,
        // then a final chunk of 0
        let mut data = vec![0xcb, 0xe3];
        data.push(b'b'); // mode
        data.push(0x00); // namelen
        data.extend(&[0, 0, 0, 5]); // timestamp
        data.extend(b"hi"); // first two payload octets
        data.push(0x02); // final chunk: 2 more payload octets
        data.extend(b"!!");
        let mut src = source_of(data);
        let packet = parse_packet(&mut src).unwrap().unwrap();
        match packet {
            Packet::LiteralData(ref p) => {
                assert_eq!(p.created_at(), 5);
                assert_eq!(p.data_len(), None);
            }
            ref other => panic!("unexpected packet: {:?}", other),
        }
        // the payload is still in the source, chunk framing included
        let mut payload = Vec::new();
        while let Some(b) = src.get().unwrap() {
            payload.push(b);
        }
        assert_eq!(payload, b"hi!!");
        assert!(parse_packet(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_unknown_packet_type_is_skipped() {
        // new format tag 10 (marker) followed by a user id packet
        let mut data = hex!("ca 03 50 47 50").to_vec();
        data.extend(&hex!("cd 02 68 69"));
        let mut src = source_of(data);
        let packet = parse_packet(&mut src).unwrap().unwrap();
        assert_eq!(packet.tag(), Tag::UserId);
        assert!(parse_packet(&mut src).unwrap().is_none());
    }

    #[test]
    fn test_stream_realigned_after_bad_body() {
        // a one pass signature with a bad version, then a user id
        let mut data = hex!("c4 0d 09 00 02 11 01 02 03 04 05 06 07 08 01").to_vec();
        data.extend(&hex!("cd 02 68 69"));
        let mut parser = PacketParser::new(Cursor::new(data));
        let first = parser.next().unwrap();
        assert!(first.is_err());
        let second = parser.next().unwrap().unwrap();
        assert_eq!(second.tag(), Tag::UserId);
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_search_packet() {
        let mut data = hex!("b4 05 48 65 6c 6c 6f").to_vec(); // user id
        data.extend(&hex!("cc 01 2a")); // trust packet
        let mut src = source_of(data);
        let (packet, pos) = search_packet(&mut src, Tag::Trust).unwrap().unwrap();
        assert_eq!(packet.tag(), Tag::Trust);
        assert_eq!(pos, 7);
    }

    #[test]
    fn test_search_packet_not_found() {
        let data = hex!("b4 05 48 65 6c 6c 6f").to_vec();
        let mut src = source_of(data);
        assert!(search_packet(&mut src, Tag::Trust).unwrap().is_none());
    }

    #[test]
    fn test_skip_some_packets() {
        let mut data = hex!("cd 02 68 69").to_vec();
        data.extend(&hex!("cd 02 68 6f"));
        data.extend(&hex!("cc 01 2a"));
        let mut src = source_of(data);
        skip_some_packets(&mut src, 2).unwrap();
        let packet = parse_packet(&mut src).unwrap().unwrap();
        assert_eq!(packet.tag(), Tag::Trust);
    }

    #[test]
    fn test_copy_all_packets_roundtrip() {
        let mut data = hex!("b4 05 48 65 6c 6c 6f").to_vec();
        data.extend(&hex!("cd 05 77 6f 72 6c 64"));
        let mut src = source_of(data.clone());
        let mut out = Vec::new();
        copy_all_packets(&mut src, &mut out).unwrap();
        assert_eq!(out, data);

        let direct = parser(Cursor::new(data)).unwrap();
        let copied = parser(Cursor::new(out)).unwrap();
        assert_eq!(direct, copied);
    }

    #[test]
    fn test_copy_partial_body_roundtrip() {
        // a partial length literal packet survives copying byte for byte
        let mut data = vec![0xcb, 0xe3];
        data.push(b'b');
        data.push(0x00);
        data.extend(&[0, 0, 0, 7]);
        data.extend(b"xy");
        data.push(0x03);
        data.extend(b"abc");
        let mut src = source_of(data.clone());
        let mut out = Vec::new();
        copy_all_packets(&mut src, &mut out).unwrap();
        assert_eq!(out, data);

        let direct = parser(Cursor::new(data)).unwrap();
        let copied = parser(Cursor::new(out)).unwrap();
        assert_eq!(direct, copied);
    }

    #[test]
    fn test_copy_some_packets_respects_stop_offset() {
        let mut data = hex!("cd 02 68 69").to_vec(); // 4 octets
        data.extend(&hex!("cc 01 2a"));
        let mut src = source_of(data);
        let mut out = Vec::new();
        // the second packet starts at offset 4
        copy_some_packets(&mut src, &mut out, 4).unwrap();
        assert_eq!(out, hex!("cd 02 68 69").to_vec());
    }

    #[test]
    fn test_parser_collects_stream() {
        let _ = pretty_env_logger::try_init();

        let mut data = hex!("b4 05 48 65 6c 6c 6f").to_vec();
        data.extend(&hex!("cc 01 2a"));
        data.extend(&hex!("cd 05 77 6f 72 6c 64"));
        let packets = parser(Cursor::new(data)).unwrap();
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0].tag(), Tag::UserId);
        assert_eq!(packets[1].tag(), Tag::Trust);
        assert_eq!(packets[2].tag(), Tag::UserId);
    }
}
