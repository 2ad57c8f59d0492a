//! A streaming parser for binary OpenPGP packet streams.
//!
//! The parser pulls bytes from a [`PacketSource`] wrapped around any
//! `Read`, decodes the packet framing (old and new format lengths,
//! indeterminate bodies, partial body chunks) and yields typed
//! [`Packet`] records. Unknown packet types are skipped, not treated as
//! errors, so a loop over [`parse_packet`] stays in sync with the next
//! packet boundary even on streams with packets it does not understand.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use pgp_parse::PacketParser;
//!
//! # fn main() -> pgp_parse::Result<()> {
//! let file = File::open("dump.pgp")?;
//! for packet in PacketParser::new(BufReader::new(file)) {
//!     println!("{:?}", packet?.tag());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Verification of signatures, decompression and decryption are out of
//! scope: the literal/compressed/encrypted packet records leave their
//! payload in the source for whatever layer sits on top.

#[macro_use]
extern crate log;
#[macro_use]
extern crate nom;
#[macro_use]
extern crate num_derive;

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

#[macro_use]
pub mod errors;
#[macro_use]
pub mod util;

pub mod crypto;
pub mod packet;
pub mod source;
pub mod types;

pub use crate::errors::{Error, Result};
pub use crate::packet::{
    copy_all_packets, copy_some_packets, parse_packet, parser, search_packet,
    skip_some_packets, Packet, PacketParser,
};
pub use crate::source::PacketSource;
pub use crate::util::{set_mpi_print_mode, set_packet_list_mode};
