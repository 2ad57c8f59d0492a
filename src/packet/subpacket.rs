//! The TLV stream inside v4 signature hashed/unhashed areas.

use byteorder::{BigEndian, ByteOrder};

use num_traits::FromPrimitive;

use crate::util::packet_length;

/// Available signature subpacket types.
/// Ref: https://tools.ietf.org/html/rfc4880.html#section-5.2.3.1
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
#[repr(u8)]
pub enum SubpacketType {
    SignatureCreationTime = 2,
    SignatureExpirationTime = 3,
    ExportableCertification = 4,
    TrustSignature = 5,
    RegularExpression = 6,
    Revocable = 7,
    KeyExpirationTime = 9,
    PreferredSymmetricAlgorithms = 11,
    RevocationKey = 12,
    Issuer = 16,
    NotationData = 20,
    PreferredHashAlgorithms = 21,
    PreferredCompressionAlgorithms = 22,
    KeyServerPreferences = 23,
    PreferredKeyServer = 24,
    PrimaryUserId = 25,
    PolicyUri = 26,
    KeyFlags = 27,
    SignersUserId = 28,
    RevocationReason = 29,
    Features = 30,
    SignatureTarget = 31,
    EmbeddedSignature = 32,
}

impl SubpacketType {
    /// Human readable name for listings.
    pub fn name(self) -> &'static str {
        match self {
            SubpacketType::SignatureCreationTime => "signature creation time",
            SubpacketType::SignatureExpirationTime => "signature expiration time",
            SubpacketType::ExportableCertification => "exportable",
            SubpacketType::TrustSignature => "trust signature",
            SubpacketType::RegularExpression => "regular expression",
            SubpacketType::Revocable => "revocable",
            SubpacketType::KeyExpirationTime => "key expiration time",
            SubpacketType::PreferredSymmetricAlgorithms => "preferred symmetric algorithms",
            SubpacketType::RevocationKey => "revocation key",
            SubpacketType::Issuer => "issuer key ID",
            SubpacketType::NotationData => "notation data",
            SubpacketType::PreferredHashAlgorithms => "preferred hash algorithms",
            SubpacketType::PreferredCompressionAlgorithms => "preferred compression algorithms",
            SubpacketType::KeyServerPreferences => "key server preferences",
            SubpacketType::PreferredKeyServer => "preferred key server",
            SubpacketType::PrimaryUserId => "primary user id",
            SubpacketType::PolicyUri => "policy URL",
            SubpacketType::KeyFlags => "key flags",
            SubpacketType::SignersUserId => "signer's user id",
            SubpacketType::RevocationReason => "revocation reason",
            SubpacketType::Features => "features",
            SubpacketType::SignatureTarget => "signature target",
            SubpacketType::EmbeddedSignature => "embedded signature",
        }
    }
}

/// One entry of a subpacket area. The criticality bit is already stripped
/// from the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpacketEntry<'a> {
    pub typ: u8,
    pub critical: bool,
    pub data: &'a [u8],
}

/// A hashed or unhashed subpacket area, stored verbatim including its
/// 2 octet big endian length prefix so later hashing reproduces the
/// original bytes exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpacketArea {
    raw: Vec<u8>,
}

impl SubpacketArea {
    pub(crate) fn new(len: u16, data: Vec<u8>) -> Self {
        let mut raw = Vec::with_capacity(2 + data.len());
        raw.push((len >> 8) as u8);
        raw.push(len as u8);
        raw.extend_from_slice(&data);
        SubpacketArea { raw }
    }

    /// The area bytes including the length prefix.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The concatenated subpackets, without the length prefix.
    pub fn data(&self) -> &[u8] {
        &self.raw[2..]
    }

    pub fn iter(&self) -> Subpackets<'_> {
        Subpackets { rest: self.data() }
    }

    /// Returns the payload of the first subpacket of the requested type.
    /// Only the return bearing types (creation time, issuer) yield a
    /// payload; anything else reports "not found".
    pub fn find(&self, reqtype: SubpacketType) -> Option<&[u8]> {
        find_subpacket(self.data(), reqtype)
    }

    /// Emits a diagnostic enumeration of the area's entries.
    pub fn list(&self, hashed: bool) {
        for entry in self.iter() {
            list_line!(
                "\t{}subpacket {} of length {} ({})",
                if hashed { "hashed " } else { "" },
                entry.typ,
                entry.data.len() + 1,
                SubpacketType::from_u8(entry.typ).map_or("?", SubpacketType::name)
            );
        }
    }
}

pub struct Subpackets<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Subpackets<'a> {
    type Item = SubpacketEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let (after_len, n) = match packet_length(self.rest) {
            Ok(res) => res,
            Err(_) => {
                warn!("buffer shorter than subpacket");
                self.rest = &[];
                return None;
            }
        };
        if n == 0 || after_len.len() < n {
            warn!("buffer shorter than subpacket");
            self.rest = &[];
            return None;
        }
        let typ = after_len[0];
        let data = &after_len[1..n];
        self.rest = &after_len[n..];

        Some(SubpacketEntry {
            typ: typ & 0x7f,
            critical: typ & 0x80 != 0,
            data,
        })
    }
}

fn find_subpacket(data: &[u8], reqtype: SubpacketType) -> Option<&[u8]> {
    let entry = (Subpackets { rest: data }).find(|entry| entry.typ == reqtype as u8)?;
    match reqtype {
        SubpacketType::SignatureCreationTime if entry.data.len() >= 4 => Some(entry.data),
        SubpacketType::Issuer if entry.data.len() >= 8 => Some(entry.data),
        SubpacketType::SignatureCreationTime | SubpacketType::Issuer => {
            warn!("subpacket of type {} too short", entry.typ);
            None
        }
        // Types the parser does not extract values from are reported as
        // "not found" instead of failing hard.
        _ => None,
    }
}

/// Scans a raw subpacket area (2 octet length prefix included) for the
/// first subpacket of the requested type, returning its payload.
pub fn parse_sig_subpkt(buffer: &[u8], reqtype: SubpacketType) -> Option<&[u8]> {
    if buffer.len() < 2 {
        return None;
    }
    let outer = BigEndian::read_u16(buffer) as usize;
    let data = buffer.get(2..2 + outer)?;

    find_subpacket(data, reqtype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_creation_time() {
        // length 5, type 2, four payload bytes
        let area = SubpacketArea::new(6, vec![5, 2, 0x5f, 0, 0, 0]);
        assert_eq!(
            area.find(SubpacketType::SignatureCreationTime),
            Some(&[0x5f, 0, 0, 0][..])
        );
        assert_eq!(area.find(SubpacketType::Issuer), None);
    }

    #[test]
    fn test_find_issuer() {
        let area = SubpacketArea::new(10, vec![9, 16, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            area.find(SubpacketType::Issuer),
            Some(&[1, 2, 3, 4, 5, 6, 7, 8][..])
        );
    }

    #[test]
    fn test_find_skips_other_types() {
        // a key flags subpacket first, then the issuer
        let mut data = vec![2, 27, 0x03];
        data.extend(&[9, 16, 8, 7, 6, 5, 4, 3, 2, 1]);
        let area = SubpacketArea::new(data.len() as u16, data);
        assert_eq!(
            area.find(SubpacketType::Issuer),
            Some(&[8, 7, 6, 5, 4, 3, 2, 1][..])
        );
    }

    #[test]
    fn test_find_unextracted_type_is_not_found() {
        // a key flags subpacket is present, but it carries no extractable
        // value, so looking it up reports "not found"
        let area = SubpacketArea::new(3, vec![2, 27, 0x03]);
        assert_eq!(area.find(SubpacketType::KeyFlags), None);
    }

    #[test]
    fn test_criticality_bit_is_stripped() {
        let area = SubpacketArea::new(6, vec![5, 2 | 0x80, 1, 2, 3, 4]);
        let entries: Vec<_> = area.iter().collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].critical);
        assert_eq!(entries[0].typ, 2);
        assert_eq!(
            area.find(SubpacketType::SignatureCreationTime),
            Some(&[1, 2, 3, 4][..])
        );
    }

    #[test]
    fn test_iteration_covers_whole_area() {
        let mut data = vec![5, 2, 1, 2, 3, 4];
        data.extend(&[9, 16, 1, 2, 3, 4, 5, 6, 7, 8]);
        data.extend(&[2, 27, 0x01]);
        let area = SubpacketArea::new(data.len() as u16, data.clone());
        let total: usize = area
            .iter()
            .map(|entry| {
                // one length octet per entry here, plus type octet
                1 + 1 + entry.data.len()
            })
            .sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_truncated_entry_stops_iteration() {
        // claims 9 octets but only 3 follow
        let area = SubpacketArea::new(4, vec![9, 16, 1, 2]);
        assert_eq!(area.iter().count(), 0);
        assert_eq!(area.find(SubpacketType::Issuer), None);
    }

    #[test]
    fn test_parse_sig_subpkt_slice() {
        let raw = vec![0x00, 0x06, 5, 2, 0xaa, 0xbb, 0xcc, 0xdd];
        assert_eq!(
            parse_sig_subpkt(&raw, SubpacketType::SignatureCreationTime),
            Some(&[0xaa, 0xbb, 0xcc, 0xdd][..])
        );
        // outer length larger than the buffer: nothing is returned
        let raw = vec![0x00, 0x20, 5, 2, 0xaa, 0xbb, 0xcc, 0xdd];
        assert_eq!(
            parse_sig_subpkt(&raw, SubpacketType::SignatureCreationTime),
            None
        );
    }
}
