use super::{parse_descriptor, parse_name};
use crate::jvm::code::{Instruction, InstructionList};
use crate::jvm::{BinaryName, Error, MethodAccessFlags, MethodDescriptor, UnqualifiedName};

/// Method definition, with its body (empty for `abstract` and `native` methods)
#[derive(Clone, Debug, PartialEq)]
pub struct MethodModel {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
    pub access_flags: MethodAccessFlags,
    pub instructions: InstructionList,
}

impl MethodModel {
    pub fn new(
        name: UnqualifiedName,
        descriptor: MethodDescriptor<BinaryName>,
        access_flags: MethodAccessFlags,
    ) -> MethodModel {
        MethodModel {
            name,
            descriptor,
            access_flags,
            instructions: InstructionList::new(),
        }
    }

    /// Create a method from an unvalidated name and a rendered descriptor (eg. `(I)V`)
    pub fn parse(
        name: &str,
        descriptor: &str,
        access_flags: MethodAccessFlags,
    ) -> Result<MethodModel, Error> {
        Ok(MethodModel::new(
            parse_name(name)?,
            parse_descriptor(descriptor)?,
            access_flags,
        ))
    }

    pub fn with_code(mut self, code: impl IntoIterator<Item = Instruction>) -> MethodModel {
        self.instructions = code.into_iter().collect();
        self
    }
}
