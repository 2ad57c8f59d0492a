//! Pull oriented byte source with the two OpenPGP body framing modes.
//!
//! A [`PacketSource`] wraps any [`Read`] and tracks the cumulative byte
//! offset. For the duration of one packet body it can be switched into
//! block mode (old style indeterminate length, body runs until the
//! underlying stream ends) or partial mode (new style partial body
//! lengths, the body arrives in chunks prefixed by a length octet).
//! Both modes reset to plain reads once the packet body is exhausted.

use std::cmp;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Plain,
    Block,
    Partial { remaining: u32, last: bool },
}

pub struct PacketSource<R> {
    inner: R,
    pos: u64,
    mode: Mode,
    name: Option<String>,
}

impl<R: Read> PacketSource<R> {
    pub fn new(inner: R) -> Self {
        PacketSource {
            inner,
            pos: 0,
            mode: Mode::Plain,
            name: None,
        }
    }

    /// Attaches a name (usually a file name) used in diagnostics.
    pub fn with_name<S: Into<String>>(inner: R, name: S) -> Self {
        PacketSource {
            inner,
            pos: 0,
            mode: Mode::Plain,
            name: Some(name.into()),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Cumulative number of bytes consumed from the underlying reader,
    /// including partial body length octets.
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Describes the current stream position for error messages.
    pub fn location(&self) -> String {
        match self.name {
            Some(ref name) => format!("{}: offset {}", name, self.pos),
            None => format!("<stream>: offset {}", self.pos),
        }
    }

    /// True while a body framing mode (block or partial) is active.
    pub fn in_block_mode(&self) -> bool {
        self.mode != Mode::Plain
    }

    /// Switches "read until end of stream" semantics on or off for the
    /// current packet body.
    pub fn set_block_mode(&mut self, active: bool) {
        self.mode = if active { Mode::Block } else { Mode::Plain };
    }

    /// Enters partial body mode with the size of the first chunk. The mode
    /// exits on its own once the final chunk has been consumed.
    pub fn set_partial_block_mode(&mut self, initial_chunk: u32) {
        self.mode = Mode::Partial {
            remaining: initial_chunk,
            last: false,
        };
    }

    /// Returns the next body byte, or `None` when the current packet body
    /// (or the whole stream) is exhausted.
    pub fn get(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match Read::read(self, &mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    /// Like [`get`](Self::get), but end of stream is an error.
    pub fn get_or_fail(&mut self) -> Result<u8> {
        self.get()?.ok_or(Error::UnexpectedEof)
    }

    /// Consumes up to `n` bytes, stopping early at end of body/stream.
    pub(crate) fn skip(&mut self, mut n: u32) -> Result<()> {
        let mut buf = [0u8; 4096];
        while n > 0 {
            let want = cmp::min(n as usize, buf.len());
            let got = Read::read(self, &mut buf[..want])?;
            if got == 0 {
                break;
            }
            n -= got as u32;
        }
        Ok(())
    }

    /// Drains the rest of the current block/partial mode body. A no-op in
    /// plain mode.
    pub(crate) fn drain_packet(&mut self) -> Result<()> {
        let mut buf = [0u8; 4096];
        while self.in_block_mode() {
            if Read::read(self, &mut buf)? == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Drains everything up to the end of the underlying stream.
    pub(crate) fn drain_to_eof(&mut self) -> Result<()> {
        let mut buf = [0u8; 4096];
        while Read::read(self, &mut buf)? != 0 {}
        Ok(())
    }

    /// Copies the rest of a partial mode body to `out`, byte identical:
    /// chunk payloads and the continuation length octets are both echoed,
    /// so the written stream carries the original framing.
    pub(crate) fn copy_partial_raw(&mut self, out: &mut dyn Write) -> Result<()> {
        loop {
            let (mut remaining, last) = match self.mode {
                Mode::Partial { remaining, last } => (remaining, last),
                _ => return Ok(()),
            };
            let mut buf = [0u8; 4096];
            while remaining > 0 {
                let want = cmp::min(remaining as usize, buf.len());
                let got = self.read_inner(&mut buf[..want])?;
                if got == 0 {
                    self.mode = Mode::Plain;
                    return Ok(());
                }
                out.write_all(&buf[..got])?;
                remaining -= got as u32;
            }
            if last {
                self.mode = Mode::Plain;
                return Ok(());
            }
            match self.next_chunk(Some(&mut *out))? {
                Some((len, fin)) => {
                    self.mode = Mode::Partial {
                        remaining: len,
                        last: fin,
                    }
                }
                None => {
                    self.mode = Mode::Plain;
                    return Ok(());
                }
            }
        }
    }

    fn get_inner(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.read_inner(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    fn read_inner(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => {
                    self.pos += n as u64;
                    return Ok(n);
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Reads the length octet(s) introducing the next partial body chunk.
    /// Returns the chunk size and whether it is the final chunk, or `None`
    /// if the stream ended at the boundary. When `echo` is set the raw
    /// length octets are forwarded to it.
    fn next_chunk(
        &mut self,
        mut echo: Option<&mut dyn Write>,
    ) -> io::Result<Option<(u32, bool)>> {
        let first = match self.get_inner()? {
            Some(b) => b,
            None => return Ok(None),
        };
        if let Some(out) = echo.as_mut() {
            out.write_all(&[first])?;
        }
        let chunk = match first {
            0..=191 => (u32::from(first), true),
            192..=223 => {
                let second = match self.get_inner()? {
                    Some(b) => b,
                    None => return Ok(None),
                };
                if let Some(out) = echo.as_mut() {
                    out.write_all(&[second])?;
                }
                (
                    ((u32::from(first) - 192) << 8) + u32::from(second) + 192,
                    true,
                )
            }
            224..=254 => (1u32 << (first - 224), false),
            255 => {
                let mut len = [0u8; 4];
                for slot in len.iter_mut() {
                    *slot = match self.get_inner()? {
                        Some(b) => b,
                        None => return Ok(None),
                    };
                }
                if let Some(out) = echo.as_mut() {
                    out.write_all(&len)?;
                }
                (BigEndian::read_u32(&len), true)
            }
        };
        Ok(Some(chunk))
    }
}

impl<R: Read> Read for PacketSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.mode {
            Mode::Plain => self.read_inner(buf),
            Mode::Block => {
                let n = self.read_inner(buf)?;
                if n == 0 {
                    self.mode = Mode::Plain;
                }
                Ok(n)
            }
            Mode::Partial {
                mut remaining,
                mut last,
            } => {
                while remaining == 0 {
                    if last {
                        self.mode = Mode::Plain;
                        return Ok(0);
                    }
                    match self.next_chunk(None)? {
                        Some((len, fin)) => {
                            remaining = len;
                            last = fin;
                        }
                        None => {
                            // truncated at a chunk boundary
                            self.mode = Mode::Plain;
                            return Ok(0);
                        }
                    }
                }
                let want = cmp::min(buf.len(), remaining as usize);
                let n = self.read_inner(&mut buf[..want])?;
                if n == 0 {
                    // truncated inside a chunk
                    self.mode = Mode::Plain;
                    return Ok(0);
                }
                self.mode = Mode::Partial {
                    remaining: remaining - n as u32,
                    last,
                };
                Ok(n)
            }
        }
    }
}

/// Per packet accounting over the source: a definite body enforces its
/// remaining length, a streamed body (block mode, partial mode, or an old
/// style compressed packet running to end of stream) delegates to the
/// source's framing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyLen {
    Definite(u32),
    Streamed,
}

pub(crate) struct BodyReader<'a, R> {
    src: &'a mut PacketSource<R>,
    len: BodyLen,
}

impl<'a, R: Read> BodyReader<'a, R> {
    pub fn new(src: &'a mut PacketSource<R>, len: BodyLen) -> Self {
        BodyReader { src, len }
    }

    /// Remaining body bytes, `None` for streamed bodies.
    pub fn remaining(&self) -> Option<u32> {
        match self.len {
            BodyLen::Definite(n) => Some(n),
            BodyLen::Streamed => None,
        }
    }

    pub fn get(&mut self) -> Result<Option<u8>> {
        if let BodyLen::Definite(0) = self.len {
            return Ok(None);
        }
        let byte = self.src.get()?;
        if byte.is_some() {
            if let BodyLen::Definite(ref mut n) = self.len {
                *n -= 1;
            }
        }
        Ok(byte)
    }

    pub fn get_or_fail(&mut self) -> Result<u8> {
        self.get()?.ok_or(Error::UnexpectedEof)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let hi = self.get_or_fail()?;
        let lo = self.get_or_fail()?;
        Ok((u16::from(hi) << 8) | u16::from(lo))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            value = (value << 8) | u32::from(self.get_or_fail()?);
        }
        Ok(value)
    }

    /// Reads exactly `n` bytes; truncation is an error.
    pub fn take(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(cmp::min(n, 64 * 1024));
        for _ in 0..n {
            out.push(self.get_or_fail()?);
        }
        Ok(out)
    }

    /// Reads whatever is left of the body.
    pub fn take_rest(&mut self) -> Result<Vec<u8>> {
        match self.len {
            BodyLen::Definite(n) => self.take(n as usize),
            BodyLen::Streamed => {
                let mut out = Vec::new();
                while let Some(byte) = self.get()? {
                    out.push(byte);
                }
                Ok(out)
            }
        }
    }

    /// Realigns the source at the next packet boundary by consuming
    /// whatever the body still owns.
    pub fn skip_rest(self) -> Result<()> {
        match self.len {
            BodyLen::Definite(n) => self.src.skip(n),
            BodyLen::Streamed => self.src.drain_packet(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_plain_reads_and_tell() {
        let mut src = PacketSource::new(Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(src.tell(), 0);
        assert_eq!(src.get().unwrap(), Some(1));
        assert_eq!(src.get().unwrap(), Some(2));
        assert_eq!(src.tell(), 2);
        assert_eq!(src.get().unwrap(), Some(3));
        assert_eq!(src.get().unwrap(), None);
        assert_eq!(src.tell(), 3);
    }

    #[test]
    fn test_block_mode_resets_at_eof() {
        let mut src = PacketSource::new(Cursor::new(vec![9u8, 8]));
        src.set_block_mode(true);
        assert!(src.in_block_mode());
        assert_eq!(src.get().unwrap(), Some(9));
        assert_eq!(src.get().unwrap(), Some(8));
        assert_eq!(src.get().unwrap(), None);
        assert!(!src.in_block_mode());
    }

    #[test]
    fn test_partial_mode_single_final_chunk() {
        // first chunk of 4 bytes, then a zero length final chunk
        let mut src = PacketSource::new(Cursor::new(vec![b'a', b'b', b'c', b'd', 0x00, 0xff]));
        src.set_partial_block_mode(4);
        let mut body = Vec::new();
        while let Some(b) = src.get().unwrap() {
            body.push(b);
        }
        assert_eq!(body, b"abcd");
        assert!(!src.in_block_mode());
        // the byte after the packet is still there
        assert_eq!(src.get().unwrap(), Some(0xff));
    }

    #[test]
    fn test_partial_mode_chained_chunks() {
        // 2 byte chunk (0xe1), then a final one octet length chunk of 3
        let mut data = vec![b'x', b'y', 0xe1, b'1', b'2', 0x03, b'a', b'b', b'c'];
        data.push(0x42);
        let mut src = PacketSource::new(Cursor::new(data));
        src.set_partial_block_mode(2);
        let mut body = Vec::new();
        while let Some(b) = src.get().unwrap() {
            body.push(b);
        }
        assert_eq!(body, b"xy12abc");
        assert_eq!(src.get().unwrap(), Some(0x42));
    }

    #[test]
    fn test_partial_mode_two_octet_final_length() {
        // final chunk with a two octet length of 192
        let mut data = vec![0xc0, 0x00];
        data.extend(std::iter::repeat(b'z').take(192));
        let mut src = PacketSource::new(Cursor::new(data));
        src.set_partial_block_mode(0);
        let mut body = Vec::new();
        while let Some(b) = src.get().unwrap() {
            body.push(b);
        }
        assert_eq!(body.len(), 192);
        // chunk length octets count towards the stream position
        assert_eq!(src.tell(), 194);
    }

    #[test]
    fn test_partial_mode_counts_length_octets() {
        let data = vec![b'a', b'b', b'c', b'd', 0x00];
        let mut src = PacketSource::new(Cursor::new(data));
        src.set_partial_block_mode(4);
        while src.get().unwrap().is_some() {}
        assert_eq!(src.tell(), 5);
    }

    #[test]
    fn test_body_reader_definite_stops() {
        let mut src = PacketSource::new(Cursor::new(vec![1u8, 2, 3, 4]));
        let mut body = BodyReader::new(&mut src, BodyLen::Definite(2));
        assert_eq!(body.get().unwrap(), Some(1));
        assert_eq!(body.get().unwrap(), Some(2));
        assert_eq!(body.get().unwrap(), None);
        assert!(body.get_or_fail().is_err());
        body.skip_rest().unwrap();
        assert_eq!(src.get().unwrap(), Some(3));
    }

    #[test]
    fn test_body_reader_skip_rest_definite() {
        let mut src = PacketSource::new(Cursor::new(vec![1u8, 2, 3, 4, 5]));
        let body = BodyReader::new(&mut src, BodyLen::Definite(3));
        body.skip_rest().unwrap();
        assert_eq!(src.get().unwrap(), Some(4));
    }

    #[test]
    fn test_copy_partial_raw_is_byte_identical() {
        // chunk of 2, continuation chunk of 1 (0xe0), final chunk of 1
        let wire = vec![b'a', b'b', 0xe0, b'c', 0x01, b'd'];
        let mut src = PacketSource::new(Cursor::new(wire.clone()));
        src.set_partial_block_mode(2);
        let mut out = Vec::new();
        src.copy_partial_raw(&mut out).unwrap();
        assert_eq!(out, wire);
        assert!(!src.in_block_mode());
    }
}
