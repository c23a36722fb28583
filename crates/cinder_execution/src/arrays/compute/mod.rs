pub mod interleave;
pub mod take;

pub(crate) mod macros;
