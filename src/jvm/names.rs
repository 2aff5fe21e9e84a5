use std::borrow::Cow;
use std::fmt;

/// Names of methods and fields
///
/// See <https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-4.html#jvms-4.2.2>
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct UnqualifiedName(Cow<'static, str>);

/// Names of classes and interfaces, with `/` separating packages (`java/lang/Object`)
///
/// See <https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-4.html#jvms-4.2.1>
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BinaryName(Cow<'static, str>);

pub trait Name: Sized {
    /// Reason the string is not a valid name, if it isn't one
    fn check_valid(name: &str) -> Result<(), String>;

    fn as_str(&self) -> &str;

    /// Validate and wrap a name
    fn from_string(name: String) -> Result<Self, String>;
}

macro_rules! name_impls {
    ($name:ident) => {
        impl Name for $name {
            fn check_valid(name: &str) -> Result<(), String> {
                $name::validate(name)
            }

            fn as_str(&self) -> &str {
                &self.0
            }

            fn from_string(name: String) -> Result<Self, String> {
                $name::validate(&name)?;
                Ok($name(Cow::Owned(name)))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_impls!(UnqualifiedName);
name_impls!(BinaryName);

impl UnqualifiedName {
    const fn name(value: &'static str) -> UnqualifiedName {
        UnqualifiedName(Cow::Borrowed(value))
    }

    // The only names allowed to contain angle brackets
    pub const INIT: Self = Self::name("<init>");
    pub const CLINIT: Self = Self::name("<clinit>");

    fn validate(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err(String::from("Unqualified name is empty"));
        }
        if let Some(c) = name.chars().find(|c| matches!(c, '.' | ';' | '[' | '/')) {
            return Err(format!("Unqualified name '{}' contains '{}'", name, c));
        }
        let special = name == "<init>" || name == "<clinit>";
        if !special && name.contains(['<', '>']) {
            return Err(format!(
                "Unqualified name '{}' has angle brackets but is not '<init>' or '<clinit>'",
                name
            ));
        }
        Ok(())
    }
}

impl BinaryName {
    const fn name(value: &'static str) -> BinaryName {
        BinaryName(Cow::Borrowed(value))
    }

    pub const OBJECT: Self = Self::name("java/lang/Object");
    pub const STRING: Self = Self::name("java/lang/String");

    fn validate(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err(String::from("Binary name is empty"));
        }
        for segment in name.split('/') {
            UnqualifiedName::validate(segment)
                .map_err(|err| format!("Binary name '{}': {}", name, err))?;
        }
        Ok(())
    }

    /// Last segment of the name (`Map$Entry` for `java/util/Map$Entry`)
    pub fn simple_name(&self) -> &str {
        match self.0.rsplit_once('/') {
            Some((_, simple)) => simple,
            None => &self.0,
        }
    }

    /// Package prefix of the name, if any (`java/util` for `java/util/Map$Entry`)
    pub fn package(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(package, _)| package)
    }
}
