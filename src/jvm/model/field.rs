use super::{parse_descriptor, parse_name};
use crate::jvm::{BinaryName, Error, FieldAccessFlags, FieldType, UnqualifiedName};

/// Field definition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldModel {
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
    pub access_flags: FieldAccessFlags,
}

impl FieldModel {
    pub fn new(
        name: UnqualifiedName,
        descriptor: FieldType<BinaryName>,
        access_flags: FieldAccessFlags,
    ) -> FieldModel {
        FieldModel {
            name,
            descriptor,
            access_flags,
        }
    }

    /// Create a field from an unvalidated name and a rendered descriptor (eg. `[J`)
    pub fn parse(
        name: &str,
        descriptor: &str,
        access_flags: FieldAccessFlags,
    ) -> Result<FieldModel, Error> {
        Ok(FieldModel::new(
            parse_name(name)?,
            parse_descriptor(descriptor)?,
            access_flags,
        ))
    }
}
