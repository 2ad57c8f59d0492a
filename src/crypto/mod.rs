pub mod compression;
pub mod hash;
pub mod public_key;
pub mod sym;
