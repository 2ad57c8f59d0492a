use smallvec::SmallVec;

use num_traits::FromPrimitive;

/// Packet header format.
/// Ref: https://tools.ietf.org/html/rfc4880.html#section-4.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Version {
    /// Old (legacy) packet format
    Old = 0,
    /// New packet format
    New = 1,
}

/// Packet tags as found in the header.
/// Ref: https://tools.ietf.org/html/rfc4880.html#section-4.3
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Tag {
    PublicKeyEncryptedSessionKey = 1,
    Signature = 2,
    SymKeyEncryptedSessionKey = 3,
    OnePassSignature = 4,
    SecretKey = 5,
    PublicKey = 6,
    SecretSubkey = 7,
    CompressedData = 8,
    SymEncryptedData = 9,
    LiteralData = 11,
    Trust = 12,
    UserId = 13,
    PublicSubkey = 14,
    /// Comment packet from the OpenPGP drafts
    OldComment = 16,
    /// Private comment packet written by early GnuPG versions
    Comment = 61,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketLength {
    Fixed(u32),
    /// Body runs until the end of the stream (old format length type 3).
    Indeterminated,
    /// Body arrives in partial length chunks (new format only).
    Partial,
}

/// A decoded packet header. The consumed header octets (at most 6) are
/// captured verbatim, they are needed for pass-through copying and for
/// hashing key packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    version: Version,
    tag: u8,
    length: PacketLength,
    raw: SmallVec<[u8; 6]>,
}

impl PacketHeader {
    pub(crate) fn new(
        version: Version,
        tag: u8,
        length: PacketLength,
        raw: SmallVec<[u8; 6]>,
    ) -> Self {
        PacketHeader {
            version,
            tag,
            length,
            raw,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The raw tag value (0..=63 for the new format, 0..=15 for the old).
    pub fn tag_raw(&self) -> u8 {
        self.tag
    }

    pub fn tag(&self) -> Option<Tag> {
        Tag::from_u8(self.tag)
    }

    pub fn length(&self) -> PacketLength {
        self.length
    }

    /// The header octets exactly as read from the stream.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }
}

/// Key packet versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum KeyVersion {
    V2 = 2,
    V3 = 3,
    V4 = 4,
}

/// Signature packet versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum SignatureVersion {
    /// Deprecated
    V2 = 2,
    V3 = 3,
    V4 = 4,
}
