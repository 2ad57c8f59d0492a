use std::io;

use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0:?}")]
    Io(#[from] io::Error),
    #[error("invalid packet (ctb=0x{ctb:02x}) at offset {offset}")]
    InvalidHeader { ctb: u8, offset: u64 },
    #[error("packet({tag}) too short")]
    PacketTooShort { tag: u8 },
    #[error("packet({tag}) with unknown version {version}")]
    UnknownVersion { tag: u8, version: u8 },
    #[error("invalid packet: {0}")]
    InvalidPacket(String),
    #[error("premature end of stream")]
    UnexpectedEof,
    #[error("invalid mpi")]
    InvalidMpi,
    #[error("failed to parse {0:?}")]
    ParsingError(nom::ErrorKind),
    #[error("incomplete input: {0:?}")]
    Incomplete(nom::Needed),
    #[error("{0}")]
    Message(String),
}

impl<'a> From<nom::Err<&'a [u8]>> for Error {
    fn from(err: nom::Err<&'a [u8]>) -> Error {
        match err {
            nom::Err::Incomplete(n) => Error::Incomplete(n),
            nom::Err::Error(ctx) | nom::Err::Failure(ctx) => {
                Error::ParsingError(ctx.into_error_kind())
            }
        }
    }
}

macro_rules! format_err {
    ($e:expr) => {
        $crate::errors::Error::Message($e.to_string())
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Message(format!($fmt, $($arg)+))
    };
}

macro_rules! bail {
    ($($t:tt)*) => {
        return Err(format_err!($($t)*))
    };
}

macro_rules! ensure {
    ($cond:expr, $($t:tt)*) => {
        if !($cond) {
            bail!($($t)*);
        }
    };
}

macro_rules! ensure_eq {
    ($left:expr, $right:expr) => {
        ensure_eq!($left, $right, "not equal")
    };
    ($left:expr, $right:expr, $($t:tt)*) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if *left_val != *right_val {
                    bail!($($t)*);
                }
            }
        }
    };
}
