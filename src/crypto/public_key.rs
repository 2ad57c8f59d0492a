use num_traits::FromPrimitive;

/// Available public key algorithms.
/// Ref: https://tools.ietf.org/html/rfc4880.html#section-9.1
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
#[repr(u8)]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt and Sign)
    RSA = 1,
    /// DEPRECATED: RSA (Encrypt-Only)
    RSAEncrypt = 2,
    /// DEPRECATED: RSA (Sign-Only)
    RSASign = 3,
    /// Elgamal (Encrypt-Only)
    ElgamalSign = 16,
    /// DSA (Digital Signature Algorithm)
    DSA = 17,
    /// Elliptic Curve: RFC-6637
    ECDH = 18,
    /// ECDSA: RFC-6637
    ECDSA = 19,
    /// DEPRECATED: Elgamal (Encrypt and Sign)
    Elgamal = 20,
    /// Reserved for Diffie-Hellman (X9.42, as defined for IETF-S/MIME)
    DiffieHellman = 21,
    /// EdDSA (not yet assigned)
    EdDSA = 22,
}

impl PublicKeyAlgorithm {
    /// Either of the two Elgamal ids.
    pub fn is_elgamal(algo: u8) -> bool {
        matches!(
            PublicKeyAlgorithm::from_u8(algo),
            Some(PublicKeyAlgorithm::ElgamalSign) | Some(PublicKeyAlgorithm::Elgamal)
        )
    }

    /// Any of the RSA ids, including the deprecated variants.
    pub fn is_rsa(algo: u8) -> bool {
        matches!(
            PublicKeyAlgorithm::from_u8(algo),
            Some(PublicKeyAlgorithm::RSA)
                | Some(PublicKeyAlgorithm::RSAEncrypt)
                | Some(PublicKeyAlgorithm::RSASign)
        )
    }

    pub fn is_dsa(algo: u8) -> bool {
        PublicKeyAlgorithm::from_u8(algo) == Some(PublicKeyAlgorithm::DSA)
    }
}
