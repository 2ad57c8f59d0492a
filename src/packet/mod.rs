mod comment;
mod compressed;
mod encrypted;
mod header;
mod key;
mod literal_data;
mod many;
mod one_pass_signature;
mod packet_sum;
mod public_key_encrypted_session_key;
mod signature;
mod subpacket;
mod sym_key_encrypted_session_key;
mod trust;
mod user_id;

pub use self::comment::Comment;
pub use self::compressed::CompressedData;
pub use self::encrypted::SymEncryptedData;
pub use self::key::{
    KeyDetails, PublicKey, PublicParams, PublicSubkey, SecretKey, SecretKeyDetails,
    SecretParams, SecretSubkey,
};
pub use self::literal_data::{DataMode, LiteralData};
pub use self::many::{
    copy_all_packets, copy_some_packets, parse_packet, parser, search_packet,
    skip_some_packets, PacketParser,
};
pub use self::one_pass_signature::OnePassSignature;
pub use self::packet_sum::Packet;
pub use self::public_key_encrypted_session_key::{
    EncryptedSessionKey, PublicKeyEncryptedSessionKey,
};
pub use self::signature::{Signature, SignatureValues};
pub use self::subpacket::{
    parse_sig_subpkt, SubpacketArea, SubpacketEntry, SubpacketType, Subpackets,
};
pub use self::sym_key_encrypted_session_key::SymKeyEncryptedSessionKey;
pub use self::trust::Trust;
pub use self::user_id::UserId;
