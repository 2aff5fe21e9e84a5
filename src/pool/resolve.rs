use super::{ClassId, ClassPool, FieldId, MethodId};
use crate::jvm::{BinaryName, FieldType, MethodDescriptor, UnqualifiedName};
use std::collections::{HashSet, VecDeque};

/// Resolves member references against a linked [`ClassPool`]
///
/// Obtained from [`ClassPool::resolver`], which refuses to hand one out while the inheritance
/// edges are missing or stale. Resolution only ever considers classes in the pool: a member
/// inherited from a class outside of it resolves to nothing.
///
/// See [the JVMS](https://docs.oracle.com/javase/specs/jvms/se18/html/jvms-5.html#jvms-5.4.3.2)
/// for the lookup order being modelled.
#[derive(Copy, Clone)]
pub struct Resolver<'p> {
    pool: &'p ClassPool,
}

impl<'p> Resolver<'p> {
    pub(super) fn new(pool: &'p ClassPool) -> Resolver<'p> {
        Resolver { pool }
    }

    pub fn pool(&self) -> &'p ClassPool {
        self.pool
    }

    /// Superclasses in the pool, starting from the direct superclass
    pub fn superclasses(&self, class: ClassId) -> impl Iterator<Item = ClassId> + 'p {
        let pool = self.pool;
        let first = pool.class(class).and_then(|class| class.parent);
        std::iter::successors(first, move |current| {
            pool.class(*current).and_then(|class| class.parent)
        })
    }

    /// Interfaces implemented by the class, its superclasses, and transitively by those interfaces
    ///
    /// The order is breadth-first, with interfaces declared closer to the class first.
    pub fn all_interfaces(&self, class: ClassId) -> Vec<ClassId> {
        let starts = std::iter::once(class).chain(self.superclasses(class));
        let mut to_visit: VecDeque<ClassId> = starts
            .filter_map(|class| self.pool.class(class))
            .flat_map(|class| class.interface_classes.iter().copied())
            .collect();

        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut interfaces = vec![];
        while let Some(interface) = to_visit.pop_front() {
            if !visited.insert(interface) {
                continue;
            }
            interfaces.push(interface);
            if let Some(interface) = self.pool.class(interface) {
                to_visit.extend(interface.interface_classes.iter().copied());
            }
        }
        interfaces
    }

    /// Interfaces directly and transitively implemented by the class itself (not by its
    /// superclasses), breadth-first
    fn own_interfaces(&self, class: ClassId) -> Vec<ClassId> {
        let mut to_visit: VecDeque<ClassId> = self
            .pool
            .class(class)
            .map(|class| class.interface_classes.iter().copied().collect())
            .unwrap_or_default();

        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut interfaces = vec![];
        while let Some(interface) = to_visit.pop_front() {
            if visited.insert(interface) {
                interfaces.push(interface);
                if let Some(interface) = self.pool.class(interface) {
                    to_visit.extend(interface.interface_classes.iter().copied());
                }
            }
        }
        interfaces
    }

    /// Is `sub` a strict, transitive sub-interface of `sup`?
    pub fn is_subinterface(&self, sub: ClassId, sup: ClassId) -> bool {
        sub != sup && self.own_interfaces(sub).contains(&sup)
    }

    /// Can a value of class `sub` be assigned to a variable of class `sup`?
    ///
    /// This searches up superclass and interface edges of the closed world.
    pub fn is_assignable(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup
            || self.superclasses(sub).any(|class| class == sup)
            || self.all_interfaces(sub).contains(&sup)
    }

    /// Resolve a field reference
    ///
    /// The lookup checks the class itself, then its interfaces (breadth-first), then each of its
    /// superclasses.
    pub fn resolve_field(
        &self,
        class: ClassId,
        name: &UnqualifiedName,
        descriptor: &FieldType<BinaryName>,
    ) -> Option<FieldId> {
        self.pool.class(class)?;

        if let Some(field) = self.pool.find_field(class, name, descriptor) {
            return Some(field);
        }
        for interface in self.own_interfaces(class) {
            if let Some(field) = self.pool.find_field(interface, name, descriptor) {
                return Some(field);
            }
        }
        self.superclasses(class)
            .find_map(|superclass| self.pool.find_field(superclass, name, descriptor))
    }

    /// Resolve a method reference
    ///
    /// When `called_as_interface` is set (ie. the reference is an `InterfaceMethodref`), only
    /// the class itself and a public instance method of its direct superclass are considered
    /// before default methods. Otherwise the whole superclass chain is searched first.
    pub fn resolve_method(
        &self,
        class: ClassId,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<BinaryName>,
        called_as_interface: bool,
    ) -> Option<MethodId> {
        self.pool.class(class)?;

        if let Some(method) = self.pool.find_method(class, name, descriptor) {
            return Some(method);
        }

        if called_as_interface {
            let inherited = self
                .superclasses(class)
                .next()
                .and_then(|superclass| self.pool.find_method(superclass, name, descriptor))
                .filter(|method| {
                    self.pool
                        .method(*method)
                        .map_or(false, |method| method.is_public() && !method.is_static())
                });
            if inherited.is_some() {
                return inherited;
            }
        } else if let Some(method) = self
            .superclasses(class)
            .find_map(|superclass| self.pool.find_method(superclass, name, descriptor))
        {
            return Some(method);
        }

        self.resolve_default_method(class, name, descriptor)
    }

    /// Pick the maximally-specific superinterface method
    ///
    /// Candidates are the non-private, non-static matching methods declared on any interface of
    /// the class or its superclasses. Concrete (default) methods win over abstract ones, and
    /// methods from interfaces that are extended by another candidate's interface are dropped.
    /// Remaining ties go to the interface that was registered first.
    pub fn resolve_default_method(
        &self,
        class: ClassId,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<BinaryName>,
    ) -> Option<MethodId> {
        let mut candidates: Vec<MethodId> = self
            .all_interfaces(class)
            .into_iter()
            .filter_map(|interface| self.pool.find_method(interface, name, descriptor))
            .filter(|method| {
                self.pool.method(*method).map_or(false, |method| {
                    method.access_flags().is_inheritable_from_interface()
                })
            })
            .collect();

        if candidates.len() <= 1 {
            return candidates.pop();
        }

        let is_concrete = |method: &MethodId| {
            self.pool
                .method(*method)
                .map_or(false, |method| !method.is_abstract())
        };
        if candidates.iter().any(is_concrete) {
            candidates.retain(is_concrete);
            if candidates.len() == 1 {
                return candidates.pop();
            }
        }

        let owner = |method: MethodId| self.pool.method(method).map(|method| method.owner);
        let most_specific: Vec<MethodId> = candidates
            .iter()
            .copied()
            .filter(|&candidate| {
                !candidates.iter().any(|&other| {
                    other != candidate
                        && match (owner(other), owner(candidate)) {
                            (Some(sub), Some(sup)) => self.is_subinterface(sub, sup),
                            _ => false,
                        }
                })
            })
            .collect();
        let survivors = if most_specific.is_empty() {
            candidates
        } else {
            most_specific
        };

        if survivors.len() > 1 {
            log::trace!(
                "Ambiguous default methods for {}{:?}: {:?}",
                name,
                descriptor,
                survivors
            );
        }

        // Class ids are handed out in registration order
        survivors.into_iter().min_by_key(|method| owner(*method))
    }

    /// Resolve a field reference through the name of the class it is accessed on
    pub fn resolve_field_named(
        &self,
        owner: &BinaryName,
        name: &UnqualifiedName,
        descriptor: &FieldType<BinaryName>,
    ) -> Option<FieldId> {
        let class = self.pool.lookup(owner)?;
        self.resolve_field(class, name, descriptor)
    }

    /// Resolve a method reference through the name of the class it is invoked on
    pub fn resolve_method_named(
        &self,
        owner: &BinaryName,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<BinaryName>,
        called_as_interface: bool,
    ) -> Option<MethodId> {
        let class = self.pool.lookup(owner)?;
        self.resolve_method(class, name, descriptor, called_as_interface)
    }
}

#[cfg(test)]
mod test {
    use crate::jvm::model::{ClassModel, FieldModel, MethodModel};
    use crate::jvm::{
        BinaryName, ClassAccessFlags, FieldAccessFlags, FieldType, MethodAccessFlags,
        MethodDescriptor, Name, ParseDescriptor, UnqualifiedName,
    };
    use crate::pool::ClassPool;

    fn name(name: &str) -> BinaryName {
        BinaryName::from_string(name.to_owned()).unwrap()
    }

    fn member(name: &str) -> UnqualifiedName {
        UnqualifiedName::from_string(name.to_owned()).unwrap()
    }

    fn class(class_name: &str, super_name: &str) -> ClassModel {
        ClassModel::new(
            name(class_name),
            Some(name(super_name)),
            ClassAccessFlags::PUBLIC,
        )
    }

    fn method(flags: MethodAccessFlags) -> MethodModel {
        MethodModel::parse("m", "()V", flags).unwrap()
    }

    fn void() -> MethodDescriptor<BinaryName> {
        MethodDescriptor::parse("()V").unwrap()
    }

    #[test]
    fn superclass_methods() {
        let mut pool = ClassPool::new();
        let a = pool.register(class("A", "java/lang/Object").with_method(method(
            MethodAccessFlags::PUBLIC,
        )));
        pool.register(class("B", "A"));
        let c = pool.register(class("C", "B"));
        pool.link().unwrap();

        let resolver = pool.resolver().unwrap();
        let declared = pool.class(a).unwrap().methods()[0];
        assert_eq!(resolver.resolve_method(c, &member("m"), &void(), false), Some(declared));
        assert_eq!(resolver.resolve_method(c, &member("x"), &void(), false), None);
        assert_eq!(resolver.superclasses(c).count(), 2);
    }

    #[test]
    fn interface_call_only_checks_direct_superclass() {
        let mut pool = ClassPool::new();
        let a = pool.register(class("A", "java/lang/Object").with_method(method(
            MethodAccessFlags::PUBLIC,
        )));
        let b = pool.register(class("B", "A"));
        let c = pool.register(class("C", "B"));
        let s = pool.register(class("S", "java/lang/Object").with_method(method(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        )));
        let t = pool.register(class("T", "S"));
        pool.link().unwrap();

        let resolver = pool.resolver().unwrap();
        let declared = pool.class(a).unwrap().methods()[0];
        assert_eq!(resolver.resolve_method(b, &member("m"), &void(), true), Some(declared));
        assert_eq!(resolver.resolve_method(c, &member("m"), &void(), true), None);
        assert!(pool.class(s).is_some());
        assert_eq!(resolver.resolve_method(t, &member("m"), &void(), true), None);
    }

    #[test]
    fn private_and_static_interface_methods_are_skipped() {
        let mut pool = ClassPool::new();
        pool.register(
            ClassModel::interface(name("I")).with_method(method(MethodAccessFlags::PRIVATE)),
        );
        pool.register(ClassModel::interface(name("J")).with_method(method(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        )));
        let a = pool.register(
            class("A", "java/lang/Object")
                .with_interface(name("I"))
                .with_interface(name("J")),
        );
        pool.link().unwrap();

        let resolver = pool.resolver().unwrap();
        assert_eq!(resolver.resolve_method(a, &member("m"), &void(), false), None);
    }

    #[test]
    fn concrete_default_beats_abstract() {
        let mut pool = ClassPool::new();
        pool.register(ClassModel::interface(name("I")).with_method(method(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
        )));
        let j = pool.register(
            ClassModel::interface(name("J")).with_method(method(MethodAccessFlags::PUBLIC)),
        );
        let a = pool.register(
            class("A", "java/lang/Object")
                .with_interface(name("I"))
                .with_interface(name("J")),
        );
        pool.link().unwrap();

        let resolver = pool.resolver().unwrap();
        let default = pool.class(j).unwrap().methods()[0];
        assert_eq!(resolver.resolve_method(a, &member("m"), &void(), false), Some(default));
    }

    #[test]
    fn interfaces_of_superclasses_provide_defaults() {
        let mut pool = ClassPool::new();
        let i = pool.register(
            ClassModel::interface(name("I")).with_method(method(MethodAccessFlags::PUBLIC)),
        );
        pool.register(class("A", "java/lang/Object").with_interface(name("I")));
        let b = pool.register(class("B", "A"));
        pool.link().unwrap();

        let resolver = pool.resolver().unwrap();
        let default = pool.class(i).unwrap().methods()[0];
        assert_eq!(resolver.resolve_method(b, &member("m"), &void(), true), Some(default));
        assert_eq!(resolver.all_interfaces(b), vec![i]);
    }

    #[test]
    fn fields_through_superclasses() {
        let mut pool = ClassPool::new();
        let int: FieldType<BinaryName> = FieldType::int();
        let a = pool.register(
            class("A", "java/lang/Object")
                .with_field(FieldModel::parse("f", "I", FieldAccessFlags::PUBLIC).unwrap()),
        );
        let b = pool.register(class("B", "A"));
        pool.link().unwrap();

        let resolver = pool.resolver().unwrap();
        let declared = pool.class(a).unwrap().fields()[0];
        assert_eq!(resolver.resolve_field(b, &member("f"), &int), Some(declared));
        assert_eq!(resolver.resolve_field(b, &member("f"), &FieldType::long()), None);
        assert_eq!(resolver.resolve_field_named(&name("B"), &member("f"), &int), Some(declared));
        assert_eq!(resolver.resolve_field_named(&name("Z"), &member("f"), &int), None);
    }

    #[test]
    fn assignability() {
        let mut pool = ClassPool::new();
        let i = pool.register(ClassModel::interface(name("I")));
        let j = pool.register(ClassModel::interface(name("J")).with_interface(name("I")));
        let a = pool.register(class("A", "java/lang/Object").with_interface(name("J")));
        let b = pool.register(class("B", "A"));
        pool.link().unwrap();

        let resolver = pool.resolver().unwrap();
        assert!(resolver.is_subinterface(j, i));
        assert!(!resolver.is_subinterface(i, j));
        assert!(!resolver.is_subinterface(i, i));
        assert!(resolver.is_assignable(b, i));
        assert!(resolver.is_assignable(b, a));
        assert!(resolver.is_assignable(b, b));
        assert!(!resolver.is_assignable(a, b));
    }

    #[test]
    fn unregistered_ids_resolve_to_nothing() {
        let mut pool = ClassPool::new();
        let a = pool.register(class("A", "java/lang/Object").with_method(method(
            MethodAccessFlags::PUBLIC,
        )));
        pool.register(class("B", "java/lang/Object"));
        pool.link().unwrap();
        pool.unregister(a);

        let resolver = pool.resolver().unwrap();
        assert_eq!(resolver.resolve_method(a, &member("m"), &void(), false), None);
        assert_eq!(resolver.resolve_field(a, &member("m"), &FieldType::int()), None);
    }
}
