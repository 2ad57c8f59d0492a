mod key_id;
mod mpi;
mod packet;
mod s2k;

pub use self::key_id::*;
pub use self::mpi::*;
pub use self::packet::*;
pub use self::s2k::*;
