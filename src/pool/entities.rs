use crate::jvm::code::InstructionList;
use crate::jvm::model::{FieldModel, MethodModel};
use crate::jvm::{
    BinaryName, ClassAccessFlags, FieldAccessFlags, FieldType, MethodAccessFlags,
    MethodDescriptor, Name, RenderDescriptor, UnqualifiedName,
};
use std::fmt;

/// Handle to a class registered in a [`ClassPool`](super::ClassPool)
///
/// Ids are handed out in registration order and are never reused, even after the class is
/// unregistered.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ClassId(pub(super) usize);

/// Handle to a method owned by a registered class
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MethodId(pub(super) usize);

/// Handle to a field owned by a registered class
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct FieldId(pub(super) usize);

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method#{}", self.0)
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// Class (or interface) inside the pool
///
/// The declared structure comes from the registered [`ClassModel`](crate::jvm::model::ClassModel).
/// The remaining edges are derived by [`ClassPool::link`](super::ClassPool::link) and
/// [`ClassPool::index_refs`](super::ClassPool::index_refs), and are empty until those run.
#[derive(Debug)]
pub struct ClassData {
    pub(super) id: ClassId,
    pub(super) name: BinaryName,
    pub(super) super_name: Option<BinaryName>,
    pub(super) interfaces: Vec<BinaryName>,
    pub(super) access_flags: ClassAccessFlags,
    pub(super) methods: Vec<MethodId>,
    pub(super) fields: Vec<FieldId>,

    // Inheritance edges
    pub(super) parent: Option<ClassId>,
    pub(super) children: Vec<ClassId>,
    pub(super) interface_classes: Vec<ClassId>,
    pub(super) implementers: Vec<ClassId>,

    // Reference edges
    pub(super) method_type_refs: Vec<MethodId>,
    pub(super) field_type_refs: Vec<FieldId>,
    pub(super) strings: Vec<String>,
}

impl ClassData {
    pub(super) fn new(
        id: ClassId,
        name: BinaryName,
        super_name: Option<BinaryName>,
        interfaces: Vec<BinaryName>,
        access_flags: ClassAccessFlags,
    ) -> ClassData {
        ClassData {
            id,
            name,
            super_name,
            interfaces,
            access_flags,
            methods: vec![],
            fields: vec![],
            parent: None,
            children: vec![],
            interface_classes: vec![],
            implementers: vec![],
            method_type_refs: vec![],
            field_type_refs: vec![],
            strings: vec![],
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &BinaryName {
        &self.name
    }

    /// Identifier of the class (its binary name)
    pub fn identifier(&self) -> &str {
        self.name.as_str()
    }

    pub fn super_name(&self) -> Option<&BinaryName> {
        self.super_name.as_ref()
    }

    /// Declared interfaces, in declaration order
    pub fn interfaces(&self) -> &[BinaryName] {
        &self.interfaces
    }

    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    pub fn methods(&self) -> &[MethodId] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldId] {
        &self.fields
    }

    /// Superclass, if it is in the pool
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Classes in the pool whose superclass is this class
    pub fn children(&self) -> &[ClassId] {
        &self.children
    }

    /// Directly implemented (or extended) interfaces that are in the pool
    pub fn interface_classes(&self) -> &[ClassId] {
        &self.interface_classes
    }

    /// Classes and interfaces in the pool that directly implement (or extend) this interface
    pub fn implementers(&self) -> &[ClassId] {
        &self.implementers
    }

    /// Methods whose code references this class (one entry per reference)
    pub fn method_type_refs(&self) -> &[MethodId] {
        &self.method_type_refs
    }

    /// Fields whose declared type mentions this class
    pub fn field_type_refs(&self) -> &[FieldId] {
        &self.field_type_refs
    }

    /// String constants loaded by the code of this class
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::INTERFACE)
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::ABSTRACT)
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::PUBLIC)
    }

    pub fn is_final(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::FINAL)
    }

    pub(super) fn clear_inheritance_edges(&mut self) {
        self.parent = None;
        self.children.clear();
        self.interface_classes.clear();
        self.implementers.clear();
    }

    pub(super) fn clear_reference_edges(&mut self) {
        self.method_type_refs.clear();
        self.field_type_refs.clear();
        self.strings.clear();
    }
}

/// Method inside the pool
#[derive(Debug)]
pub struct MethodData {
    pub(super) id: MethodId,
    pub(super) owner: ClassId,
    pub(super) owner_name: BinaryName,
    pub(super) name: UnqualifiedName,
    pub(super) descriptor: MethodDescriptor<BinaryName>,
    pub(super) access_flags: MethodAccessFlags,

    /// Method body
    ///
    /// Editing the body does not update reference edges: re-run
    /// [`ClassPool::index_refs`](super::ClassPool::index_refs) afterwards.
    pub instructions: InstructionList,

    pub(super) refs_out: Vec<MethodId>,
    pub(super) refs_in: Vec<MethodId>,
    pub(super) field_read_refs: Vec<FieldId>,
    pub(super) field_write_refs: Vec<FieldId>,
    pub(super) class_refs: Vec<ClassId>,
}

impl MethodData {
    pub(super) fn new(
        id: MethodId,
        owner: ClassId,
        owner_name: BinaryName,
        model: MethodModel,
    ) -> MethodData {
        MethodData {
            id,
            owner,
            owner_name,
            name: model.name,
            descriptor: model.descriptor,
            access_flags: model.access_flags,
            instructions: model.instructions,
            refs_out: vec![],
            refs_in: vec![],
            field_read_refs: vec![],
            field_write_refs: vec![],
            class_refs: vec![],
        }
    }

    pub(super) fn into_model(self) -> MethodModel {
        MethodModel {
            name: self.name,
            descriptor: self.descriptor,
            access_flags: self.access_flags,
            instructions: self.instructions,
        }
    }

    pub fn id(&self) -> MethodId {
        self.id
    }

    /// Declaring class
    pub fn owner(&self) -> ClassId {
        self.owner
    }

    pub fn name(&self) -> &UnqualifiedName {
        &self.name
    }

    pub fn descriptor(&self) -> &MethodDescriptor<BinaryName> {
        &self.descriptor
    }

    pub fn access_flags(&self) -> MethodAccessFlags {
        self.access_flags
    }

    /// Identifier of the method, eg. `a/B.run(I)V`
    pub fn identifier(&self) -> String {
        format!(
            "{}.{}{}",
            self.owner_name,
            self.name,
            self.descriptor.render()
        )
    }

    /// Return type (`None` for `void`)
    pub fn return_type(&self) -> Option<&FieldType<BinaryName>> {
        self.descriptor.return_type.as_ref()
    }

    pub fn argument_types(&self) -> &[FieldType<BinaryName>] {
        &self.descriptor.parameters
    }

    /// Methods called from this method's code (one entry per call site)
    pub fn refs_out(&self) -> &[MethodId] {
        &self.refs_out
    }

    /// Methods whose code calls this method (one entry per call site)
    pub fn refs_in(&self) -> &[MethodId] {
        &self.refs_in
    }

    pub fn field_read_refs(&self) -> &[FieldId] {
        &self.field_read_refs
    }

    pub fn field_write_refs(&self) -> &[FieldId] {
        &self.field_write_refs
    }

    /// Classes referenced by this method's code
    pub fn class_refs(&self) -> &[ClassId] {
        &self.class_refs
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::ABSTRACT)
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::PUBLIC)
    }

    pub fn is_private(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::PRIVATE)
    }

    pub fn is_final(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::FINAL)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == UnqualifiedName::INIT
    }

    pub(super) fn clear_reference_edges(&mut self) {
        self.refs_out.clear();
        self.refs_in.clear();
        self.field_read_refs.clear();
        self.field_write_refs.clear();
        self.class_refs.clear();
    }
}

/// Field inside the pool
#[derive(Debug)]
pub struct FieldData {
    pub(super) id: FieldId,
    pub(super) owner: ClassId,
    pub(super) owner_name: BinaryName,
    pub(super) name: UnqualifiedName,
    pub(super) descriptor: FieldType<BinaryName>,
    pub(super) access_flags: FieldAccessFlags,

    pub(super) read_refs: Vec<MethodId>,
    pub(super) write_refs: Vec<MethodId>,
}

impl FieldData {
    pub(super) fn new(
        id: FieldId,
        owner: ClassId,
        owner_name: BinaryName,
        model: FieldModel,
    ) -> FieldData {
        FieldData {
            id,
            owner,
            owner_name,
            name: model.name,
            descriptor: model.descriptor,
            access_flags: model.access_flags,
            read_refs: vec![],
            write_refs: vec![],
        }
    }

    pub(super) fn into_model(self) -> FieldModel {
        FieldModel {
            name: self.name,
            descriptor: self.descriptor,
            access_flags: self.access_flags,
        }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Declaring class
    pub fn owner(&self) -> ClassId {
        self.owner
    }

    pub fn name(&self) -> &UnqualifiedName {
        &self.name
    }

    pub fn descriptor(&self) -> &FieldType<BinaryName> {
        &self.descriptor
    }

    pub fn access_flags(&self) -> FieldAccessFlags {
        self.access_flags
    }

    /// Identifier of the field, eg. `a/B.count`
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.owner_name, self.name)
    }

    /// Methods whose code reads this field (one entry per access)
    pub fn read_refs(&self) -> &[MethodId] {
        &self.read_refs
    }

    /// Methods whose code writes this field (one entry per access)
    pub fn write_refs(&self) -> &[MethodId] {
        &self.write_refs
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::PUBLIC)
    }

    pub fn is_private(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::PRIVATE)
    }

    pub fn is_final(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::FINAL)
    }

    pub(super) fn clear_reference_edges(&mut self) {
        self.read_refs.clear();
        self.write_refs.clear();
    }
}
