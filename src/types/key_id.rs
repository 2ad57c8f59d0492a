use std::fmt;

use crate::errors::Result;

/// An 8 octet key id, as found in signatures and encrypted session keys.
/// Ref: https://tools.ietf.org/html/rfc4880.html#section-3.3
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyId([u8; 8]);

impl KeyId {
    pub fn from_slice(input: &[u8]) -> Result<KeyId> {
        ensure_eq!(input.len(), 8, "invalid key id length {}", input.len());
        let mut raw = [0u8; 8];
        raw.copy_from_slice(input);

        Ok(KeyId(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", u64::from_be_bytes(self.0))
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_id_display() {
        let id = KeyId::from_slice(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]).unwrap();
        assert_eq!(id.to_string(), "0123456789ABCDEF");
    }

    #[test]
    fn test_key_id_bad_length() {
        assert!(KeyId::from_slice(&[1, 2, 3]).is_err());
    }
}
