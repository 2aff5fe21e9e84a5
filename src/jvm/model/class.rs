use super::{parse_name, FieldModel, MethodModel};
use crate::jvm::{BinaryName, ClassAccessFlags, Error};

/// Class (or interface) definition
#[derive(Clone, Debug, PartialEq)]
pub struct ClassModel {
    pub name: BinaryName,

    /// Only `java/lang/Object` (and classes outside the closed world) have no superclass
    pub super_name: Option<BinaryName>,

    /// Directly implemented interfaces (or extended interfaces, for an interface)
    pub interfaces: Vec<BinaryName>,

    pub access_flags: ClassAccessFlags,
    pub methods: Vec<MethodModel>,
    pub fields: Vec<FieldModel>,
}

impl ClassModel {
    pub fn new(
        name: BinaryName,
        super_name: Option<BinaryName>,
        access_flags: ClassAccessFlags,
    ) -> ClassModel {
        ClassModel {
            name,
            super_name,
            interfaces: vec![],
            access_flags,
            methods: vec![],
            fields: vec![],
        }
    }

    /// Create a class from unvalidated names
    pub fn parse(
        name: &str,
        super_name: Option<&str>,
        access_flags: ClassAccessFlags,
    ) -> Result<ClassModel, Error> {
        let super_name = super_name.map(parse_name).transpose()?;
        Ok(ClassModel::new(parse_name(name)?, super_name, access_flags))
    }

    /// Interface extending nothing but `java/lang/Object`
    pub fn interface(name: BinaryName) -> ClassModel {
        ClassModel::new(name, Some(BinaryName::OBJECT), ClassAccessFlags::PUBLIC_INTERFACE)
    }

    pub fn with_interface(mut self, interface: BinaryName) -> ClassModel {
        self.interfaces.push(interface);
        self
    }

    pub fn with_method(mut self, method: MethodModel) -> ClassModel {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, field: FieldModel) -> ClassModel {
        self.fields.push(field);
        self
    }

    pub fn add_method(&mut self, method: MethodModel) {
        self.methods.push(method);
    }

    pub fn add_field(&mut self, field: FieldModel) {
        self.fields.push(field);
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::Name;

    #[test]
    fn parse_class() {
        let class = ClassModel::parse("a/B", Some("java/lang/Object"), ClassAccessFlags::PUBLIC)
            .unwrap();
        assert_eq!(class.name.as_str(), "a/B");
        assert_eq!(class.super_name, Some(BinaryName::OBJECT));
        assert!(!class.is_interface());

        assert!(matches!(
            ClassModel::parse("a/B;", None, ClassAccessFlags::PUBLIC),
            Err(Error::MalformedName(_))
        ));
    }
}
