//! Subcommand implementations.

pub mod decode;
pub mod delta;
pub mod normalize;
