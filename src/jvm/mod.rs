//! Vocabulary of the JVM: names, descriptors, access flags, instructions, and class definitions

mod access_flags;
pub mod code;
mod descriptors;
mod errors;
pub mod model;
mod names;

pub use access_flags::*;
pub use descriptors::*;
pub use errors::*;
pub use names::*;
