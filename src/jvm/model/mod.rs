//! Class definitions as handed to the class pool
//!
//! This is the vocabulary shared with whatever reads class files (and whatever writes them back
//! out). It carries no derived information: inheritance edges and references are computed by the
//! [`ClassPool`](crate::pool::ClassPool) once the classes are registered.
//!
//!   - __Class__ is represented using [`ClassModel`]
//!   - __Method__ is represented using [`MethodModel`]
//!   - __Field__ is represented using [`FieldModel`]

mod class;
mod field;
mod method;

pub use class::*;
pub use field::*;
pub use method::*;

use crate::jvm::{Error, Name, ParseDescriptor};

fn parse_name<N: Name>(name: &str) -> Result<N, Error> {
    N::from_string(name.to_owned()).map_err(Error::MalformedName)
}

fn parse_descriptor<D: ParseDescriptor>(descriptor: &str) -> Result<D, Error> {
    D::parse(descriptor)
        .map_err(|err| Error::MalformedDescriptor(format!("'{}': {}", descriptor, err)))
}
