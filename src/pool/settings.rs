/// Controls which references [`ClassPool::index_refs`](super::ClassPool::index_refs) records
///
/// Calls and field accesses are always indexed: member resolution is what the pool is for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Record class references from `new`, `anewarray`, `checkcast`, `instanceof`, and
    /// `multianewarray`
    ///
    /// Array types count as references to their element class.
    pub index_type_references: bool,

    /// Collect the string constants loaded with `ldc` into the owning class's `strings`
    pub collect_strings: bool,

    /// Record fields whose declared type mentions a class in the pool on that class
    pub index_field_types: bool,
}

impl Settings {
    pub fn new() -> Settings {
        Settings {
            index_type_references: true,
            collect_strings: true,
            index_field_types: true,
        }
    }

    /// Only index calls and field accesses
    pub fn members_only() -> Settings {
        Settings {
            index_type_references: false,
            collect_strings: false,
            index_field_types: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings::new()
    }
}
