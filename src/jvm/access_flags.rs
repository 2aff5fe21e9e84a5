//! Access flags, as stored in class files
//!
//! Class readers hand over the raw `u16`s, so unknown bits are dropped with `from_bits_truncate`
//! rather than rejected.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-4.html#jvms-4.1-200-E.1>

use bitflags::bitflags;

bitflags! {
    #[derive(Default)]
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        /// Legacy `invokespecial` semantics, set by every modern compiler
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;

        /// What `javac` sets on a public interface
        const PUBLIC_INTERFACE = Self::PUBLIC.bits | Self::INTERFACE.bits | Self::ABSTRACT.bits;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

impl MethodAccessFlags {
    /// Private and static interface methods are never selected as defaults
    pub fn is_inheritable_from_interface(self) -> bool {
        !self.intersects(MethodAccessFlags::PRIVATE | MethodAccessFlags::STATIC)
    }
}

bitflags! {
    #[derive(Default)]
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;

        /// Interface fields are implicitly constants
        const CONSTANT = Self::PUBLIC.bits | Self::STATIC.bits | Self::FINAL.bits;
    }
}
