mod hash;
mod keys;
mod verify;

pub use keys::*;
pub use verify::*;

pub(crate) use hash::*;
