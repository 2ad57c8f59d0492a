use crate::packet::{
    Comment, CompressedData, LiteralData, OnePassSignature, PublicKey,
    PublicKeyEncryptedSessionKey, PublicSubkey, SecretKey, SecretSubkey, Signature,
    SymEncryptedData, SymKeyEncryptedSessionKey, Trust, UserId,
};
use crate::types::Tag;

/// A parsed packet: the type tag picks the body variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    PublicKeyEncryptedSessionKey(PublicKeyEncryptedSessionKey),
    Signature(Signature),
    SymKeyEncryptedSessionKey(SymKeyEncryptedSessionKey),
    OnePassSignature(OnePassSignature),
    SecretKey(SecretKey),
    PublicKey(PublicKey),
    SecretSubkey(SecretSubkey),
    CompressedData(CompressedData),
    SymEncryptedData(SymEncryptedData),
    LiteralData(LiteralData),
    Trust(Trust),
    UserId(UserId),
    PublicSubkey(PublicSubkey),
    Comment(Comment),
}

impl Packet {
    pub fn tag(&self) -> Tag {
        match self {
            Packet::PublicKeyEncryptedSessionKey(_) => Tag::PublicKeyEncryptedSessionKey,
            Packet::Signature(_) => Tag::Signature,
            Packet::SymKeyEncryptedSessionKey(_) => Tag::SymKeyEncryptedSessionKey,
            Packet::OnePassSignature(_) => Tag::OnePassSignature,
            Packet::SecretKey(_) => Tag::SecretKey,
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::SecretSubkey(_) => Tag::SecretSubkey,
            Packet::CompressedData(_) => Tag::CompressedData,
            Packet::SymEncryptedData(_) => Tag::SymEncryptedData,
            Packet::LiteralData(_) => Tag::LiteralData,
            Packet::Trust(_) => Tag::Trust,
            Packet::UserId(_) => Tag::UserId,
            Packet::PublicSubkey(_) => Tag::PublicSubkey,
            Packet::Comment(_) => Tag::Comment,
        }
    }
}

macro_rules! impl_into {
    ($body:ident) => {
        impl From<$body> for Packet {
            fn from(body: $body) -> Packet {
                Packet::$body(body)
            }
        }
    };
}

impl_into!(PublicKeyEncryptedSessionKey);
impl_into!(Signature);
impl_into!(SymKeyEncryptedSessionKey);
impl_into!(OnePassSignature);
impl_into!(SecretKey);
impl_into!(PublicKey);
impl_into!(SecretSubkey);
impl_into!(CompressedData);
impl_into!(SymEncryptedData);
impl_into!(LiteralData);
impl_into!(Trust);
impl_into!(UserId);
impl_into!(PublicSubkey);
impl_into!(Comment);
