// Public library interface for orgmap-rs
// The binaries drive the same pipeline through these modules

pub mod filter;
pub mod layout;
pub mod pipeline;
pub mod record;
pub mod tree;
