use std::io::Read;

use num_traits::FromPrimitive;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::sym::SymmetricKeyAlgorithm;
use crate::errors::Result;
use crate::source::BodyReader;

/// String-to-key specifier modes. Iterated+salted uses the historic id 4
/// with a raw 32 bit iteration count, the encoding written by early GnuPG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum StringToKeyMode {
    Simple = 0,
    Salted = 1,
    IteratedSalted = 4,
}

/// A string-to-key specifier.
/// Ref: https://tools.ietf.org/html/rfc4880.html#section-3.7
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringToKey {
    Simple {
        hash_algo: u8,
    },
    Salted {
        hash_algo: u8,
        salt: [u8; 8],
    },
    IteratedSalted {
        hash_algo: u8,
        salt: [u8; 8],
        count: u32,
    },
    /// A mode this implementation does not know. No parameters are
    /// consumed for it.
    Unknown {
        mode: u8,
        hash_algo: u8,
    },
}

impl StringToKey {
    pub fn mode(&self) -> u8 {
        match *self {
            StringToKey::Simple { .. } => StringToKeyMode::Simple as u8,
            StringToKey::Salted { .. } => StringToKeyMode::Salted as u8,
            StringToKey::IteratedSalted { .. } => StringToKeyMode::IteratedSalted as u8,
            StringToKey::Unknown { mode, .. } => mode,
        }
    }

    pub fn hash_algo(&self) -> u8 {
        match *self {
            StringToKey::Simple { hash_algo }
            | StringToKey::Salted { hash_algo, .. }
            | StringToKey::IteratedSalted { hash_algo, .. }
            | StringToKey::Unknown { hash_algo, .. } => hash_algo,
        }
    }

    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        HashAlgorithm::from_u8(self.hash_algo())
    }

    pub fn salt(&self) -> Option<&[u8; 8]> {
        match *self {
            StringToKey::Salted { ref salt, .. }
            | StringToKey::IteratedSalted { ref salt, .. } => Some(salt),
            _ => None,
        }
    }

    pub fn count(&self) -> Option<u32> {
        match *self {
            StringToKey::IteratedSalted { count, .. } => Some(count),
            _ => None,
        }
    }
}

/// Reads the S2K parameters following a (mode, hash) pair: an 8 octet salt
/// for the salted modes and a raw 32 bit count for iterated+salted. An
/// unknown mode consumes nothing and yields the `Unknown` marker; the
/// caller decides whether that is tolerable.
pub(crate) fn read_s2k<R: Read>(
    body: &mut BodyReader<'_, R>,
    mode: u8,
    hash_algo: u8,
) -> Result<StringToKey> {
    let s2k = match StringToKeyMode::from_u8(mode) {
        Some(StringToKeyMode::Simple) => StringToKey::Simple { hash_algo },
        Some(StringToKeyMode::Salted) => {
            let mut salt = [0u8; 8];
            for slot in salt.iter_mut() {
                *slot = body.get_or_fail()?;
            }
            StringToKey::Salted { hash_algo, salt }
        }
        Some(StringToKeyMode::IteratedSalted) => {
            let mut salt = [0u8; 8];
            for slot in salt.iter_mut() {
                *slot = body.get_or_fail()?;
            }
            let count = body.read_u32()?;
            StringToKey::IteratedSalted {
                hash_algo,
                salt,
                count,
            }
        }
        None => StringToKey::Unknown { mode, hash_algo },
    };

    Ok(s2k)
}

/// Protection parameters of a secret key packet: the symmetric cipher, the
/// S2K turning a passphrase into the cipher key, and the CFB IV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyProtection {
    pub(crate) cipher_algo: u8,
    pub(crate) s2k: StringToKey,
    pub(crate) iv: [u8; 8],
}

impl KeyProtection {
    pub fn cipher_algo(&self) -> u8 {
        self.cipher_algo
    }

    pub fn cipher_algorithm(&self) -> Option<SymmetricKeyAlgorithm> {
        SymmetricKeyAlgorithm::from_u8(self.cipher_algo)
    }

    pub fn s2k(&self) -> &StringToKey {
        &self.s2k
    }

    pub fn iv(&self) -> &[u8; 8] {
        &self.iv
    }
}
