//! Shorthands for building class pools and method bodies in tests

#![allow(dead_code)]

use classpool::jvm::code::{FieldRef, Instruction, InvokeType, MethodRef};
use classpool::jvm::model::{ClassModel, FieldModel, MethodModel};
use classpool::jvm::{
    BinaryName, ClassAccessFlags, FieldAccessFlags, FieldType, MethodAccessFlags,
    MethodDescriptor, Name, ParseDescriptor, UnqualifiedName,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn name(name: &str) -> BinaryName {
    BinaryName::from_string(name.to_owned()).unwrap()
}

pub fn member(name: &str) -> UnqualifiedName {
    UnqualifiedName::from_string(name.to_owned()).unwrap()
}

pub fn method_descriptor(descriptor: &str) -> MethodDescriptor<BinaryName> {
    MethodDescriptor::parse(descriptor).unwrap()
}

pub fn field_descriptor(descriptor: &str) -> FieldType<BinaryName> {
    FieldType::parse(descriptor).unwrap()
}

/// Public class with a superclass
pub fn class(class_name: &str, super_name: &str) -> ClassModel {
    ClassModel::new(
        name(class_name),
        Some(name(super_name)),
        ClassAccessFlags::PUBLIC,
    )
}

pub fn interface(interface_name: &str) -> ClassModel {
    ClassModel::interface(name(interface_name))
}

pub fn method(method_name: &str, descriptor: &str, access_flags: MethodAccessFlags) -> MethodModel {
    MethodModel::parse(method_name, descriptor, access_flags).unwrap()
}

/// Interface method with a body
pub fn default_method(method_name: &str, descriptor: &str) -> MethodModel {
    method(method_name, descriptor, MethodAccessFlags::PUBLIC)
        .with_code(vec![Instruction::Return])
}

pub fn abstract_method(method_name: &str, descriptor: &str) -> MethodModel {
    method(
        method_name,
        descriptor,
        MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
    )
}

pub fn field(field_name: &str, descriptor: &str, access_flags: FieldAccessFlags) -> FieldModel {
    FieldModel::parse(field_name, descriptor, access_flags).unwrap()
}

pub fn invoke(
    invoke_type: InvokeType,
    owner: &str,
    method_name: &str,
    descriptor: &str,
) -> Instruction {
    Instruction::Invoke(
        invoke_type,
        MethodRef {
            owner: name(owner),
            name: member(method_name),
            descriptor: method_descriptor(descriptor),
            is_interface: invoke_type == InvokeType::Interface,
        },
    )
}

pub fn field_ref(owner: &str, field_name: &str, descriptor: &str) -> FieldRef {
    FieldRef {
        owner: name(owner),
        name: member(field_name),
        descriptor: field_descriptor(descriptor),
    }
}
