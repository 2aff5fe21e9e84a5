//! Cross-referenced symbol table of a closed set of classes
//!
//! Classes are registered from their [`ClassModel`]s, then two passes derive the graph:
//!
//!   - [`ClassPool::link`] resolves superclass and interface names into parent/child and
//!     interface/implementer edges
//!   - [`ClassPool::index_refs`] walks every method body, resolves the members it references (see
//!     [`Resolver`]), and records call, field access, and class reference edges
//!
//! Derived edges are never recomputed implicitly. Registering a class puts the pool back into
//! the [`GraphState::Unlinked`] state, and resolution refuses to run against a graph that is not
//! linked.
//!
//! Entities are stored in slots indexed by their ids and edges are plain lists of ids, so there
//! are no reference cycles and unregistering a class can prune every edge that touches it.

mod entities;
mod indexer;
mod linker;
mod resolve;
mod settings;

pub use entities::*;
pub use indexer::IndexStats;
pub use resolve::Resolver;
pub use settings::Settings;

use crate::jvm::model::ClassModel;
use crate::jvm::{BinaryName, Error, FieldType, MethodDescriptor, UnqualifiedName};
use indexmap::IndexMap;

/// How far the derived graph has been computed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraphState {
    /// Inheritance edges are missing or stale
    Unlinked,

    /// Inheritance edges are up to date, reference edges are missing or stale
    Linked,

    /// Both inheritance and reference edges are up to date
    Indexed,
}

pub struct ClassPool {
    settings: Settings,

    /// Slots, indexed by the ids (`None` once the entity is unregistered)
    classes: Vec<Option<ClassData>>,
    methods: Vec<Option<MethodData>>,
    fields: Vec<Option<FieldData>>,

    /// Registered classes, in registration order
    names: IndexMap<BinaryName, ClassId>,

    state: GraphState,
}

impl ClassPool {
    pub fn new() -> ClassPool {
        ClassPool::with_settings(Settings::new())
    }

    pub fn with_settings(settings: Settings) -> ClassPool {
        ClassPool {
            settings,
            classes: vec![],
            methods: vec![],
            fields: vec![],
            names: IndexMap::new(),
            state: GraphState::Unlinked,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    /// Add a class (and its members) to the pool
    ///
    /// A class already registered under the same name is unregistered first.
    pub fn register(&mut self, model: ClassModel) -> ClassId {
        if let Some(previous) = self.lookup(&model.name) {
            log::trace!("Replacing previously registered class {}", model.name);
            self.unregister(previous);
        }

        let ClassModel {
            name,
            super_name,
            interfaces,
            access_flags,
            methods,
            fields,
        } = model;

        let id = ClassId(self.classes.len());
        let mut class = ClassData::new(id, name.clone(), super_name, interfaces, access_flags);

        for method in methods {
            let method_id = MethodId(self.methods.len());
            self.methods
                .push(Some(MethodData::new(method_id, id, name.clone(), method)));
            class.methods.push(method_id);
        }
        for field in fields {
            let field_id = FieldId(self.fields.len());
            self.fields
                .push(Some(FieldData::new(field_id, id, name.clone(), field)));
            class.fields.push(field_id);
        }

        log::trace!(
            "Registered {} ({} methods, {} fields) as {:?}",
            name,
            class.methods.len(),
            class.fields.len(),
            id
        );
        self.classes.push(Some(class));
        self.names.insert(name, id);
        self.state = GraphState::Unlinked;
        id
    }

    /// Remove a class (and its members) from the pool, pruning every edge that touches them
    ///
    /// Returns the class as it was registered (with any edits made to its method bodies), or
    /// `None` if the class is not in the pool.
    pub fn unregister(&mut self, id: ClassId) -> Option<ClassModel> {
        let class = self.classes.get_mut(id.0)?.take()?;
        self.names.shift_remove(&class.name);

        // Inheritance edges
        if let Some(parent) = class.parent {
            if let Some(parent) = self.class_slot(parent) {
                prune(&mut parent.children, id);
            }
        }
        for &child in &class.children {
            if let Some(child) = self.class_slot(child) {
                child.parent = None;
            }
        }
        for &interface in &class.interface_classes {
            if let Some(interface) = self.class_slot(interface) {
                prune(&mut interface.implementers, id);
            }
        }
        for &implementer in &class.implementers {
            if let Some(implementer) = self.class_slot(implementer) {
                prune(&mut implementer.interface_classes, id);
            }
        }
        for &method in &class.method_type_refs {
            if let Some(method) = self.method_slot(method) {
                prune(&mut method.class_refs, id);
            }
        }

        // Members and their reference edges
        let mut methods = Vec::with_capacity(class.methods.len());
        for &method_id in &class.methods {
            if let Some(method) = self.methods.get_mut(method_id.0).and_then(Option::take) {
                self.prune_method(&method);
                methods.push(method.into_model());
            }
        }
        let mut fields = Vec::with_capacity(class.fields.len());
        for &field_id in &class.fields {
            if let Some(field) = self.fields.get_mut(field_id.0).and_then(Option::take) {
                self.prune_field(&field);
                fields.push(field.into_model());
            }
        }

        if self.state == GraphState::Indexed {
            self.state = GraphState::Linked;
        }
        log::trace!("Unregistered {} ({:?})", class.name, id);

        Some(ClassModel {
            name: class.name,
            super_name: class.super_name,
            interfaces: class.interfaces,
            access_flags: class.access_flags,
            methods,
            fields,
        })
    }

    pub fn unregister_named(&mut self, name: &BinaryName) -> Option<ClassModel> {
        let id = self.lookup(name)?;
        self.unregister(id)
    }

    fn prune_method(&mut self, method: &MethodData) {
        let id = method.id;
        for &callee in &method.refs_out {
            if let Some(callee) = self.method_slot(callee) {
                prune(&mut callee.refs_in, id);
            }
        }
        for &caller in &method.refs_in {
            if let Some(caller) = self.method_slot(caller) {
                prune(&mut caller.refs_out, id);
            }
        }
        for &field in &method.field_read_refs {
            if let Some(field) = self.field_slot(field) {
                prune(&mut field.read_refs, id);
            }
        }
        for &field in &method.field_write_refs {
            if let Some(field) = self.field_slot(field) {
                prune(&mut field.write_refs, id);
            }
        }
        for &class in &method.class_refs {
            if let Some(class) = self.class_slot(class) {
                prune(&mut class.method_type_refs, id);
            }
        }
    }

    fn prune_field(&mut self, field: &FieldData) {
        let id = field.id;
        for &reader in &field.read_refs {
            if let Some(reader) = self.method_slot(reader) {
                prune(&mut reader.field_read_refs, id);
            }
        }
        for &writer in &field.write_refs {
            if let Some(writer) = self.method_slot(writer) {
                prune(&mut writer.field_write_refs, id);
            }
        }
        if let Some(type_class) = field.descriptor.class().and_then(|name| self.lookup(name)) {
            if let Some(type_class) = self.class_slot(type_class) {
                prune(&mut type_class.field_type_refs, id);
            }
        }
    }

    pub fn lookup(&self, name: &BinaryName) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &BinaryName) -> bool {
        self.names.contains_key(name)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Snapshot of the registered classes, in registration order
    pub fn all(&self) -> Vec<ClassId> {
        self.names.values().copied().collect()
    }

    /// Registered classes, in registration order
    pub fn classes(&self) -> impl Iterator<Item = &ClassData> + '_ {
        self.names.values().filter_map(move |id| self.class(*id))
    }

    /// First class (in registration order) matching the predicate
    pub fn find_class(&self, mut predicate: impl FnMut(&ClassData) -> bool) -> Option<ClassId> {
        self.classes()
            .find(|class| predicate(*class))
            .map(|class| class.id)
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassData> {
        self.classes.get(id.0)?.as_ref()
    }

    pub fn method(&self, id: MethodId) -> Option<&MethodData> {
        self.methods.get(id.0)?.as_ref()
    }

    /// Mutable access to a method, for editing its body
    ///
    /// The body may no longer match the reference edges, so an indexed pool drops back to
    /// [`GraphState::Linked`].
    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut MethodData> {
        let method = self.methods.get_mut(id.0)?.as_mut()?;
        if self.state == GraphState::Indexed {
            self.state = GraphState::Linked;
        }
        Some(method)
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldData> {
        self.fields.get(id.0)?.as_ref()
    }

    /// Methods declared on a class
    pub fn methods_of(&self, class: ClassId) -> impl Iterator<Item = &MethodData> + '_ {
        self.class(class)
            .into_iter()
            .flat_map(|class| class.methods.iter())
            .filter_map(move |id| self.method(*id))
    }

    /// Fields declared on a class
    pub fn fields_of(&self, class: ClassId) -> impl Iterator<Item = &FieldData> + '_ {
        self.class(class)
            .into_iter()
            .flat_map(|class| class.fields.iter())
            .filter_map(move |id| self.field(*id))
    }

    /// Method declared on the class itself (inherited methods are not considered)
    pub fn find_method(
        &self,
        class: ClassId,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<BinaryName>,
    ) -> Option<MethodId> {
        self.methods_of(class)
            .find(|method| &method.name == name && &method.descriptor == descriptor)
            .map(|method| method.id)
    }

    /// Field declared on the class itself (inherited fields are not considered)
    pub fn find_field(
        &self,
        class: ClassId,
        name: &UnqualifiedName,
        descriptor: &FieldType<BinaryName>,
    ) -> Option<FieldId> {
        self.fields_of(class)
            .find(|field| &field.name == name && &field.descriptor == descriptor)
            .map(|field| field.id)
    }

    /// Member resolution against the linked graph
    pub fn resolver(&self) -> Result<Resolver<'_>, Error> {
        match self.state {
            GraphState::Unlinked => Err(Error::GraphNotLinked),
            GraphState::Linked | GraphState::Indexed => Ok(Resolver::new(self)),
        }
    }

    /// Link the inheritance graph, then index references
    pub fn process_refs(&mut self) -> Result<IndexStats, Error> {
        self.link()?;
        self.index_refs()
    }

    /// Drop every derived edge (keeping all ids valid)
    ///
    /// The passes need to be run again afterwards.
    pub fn rebuild(&mut self) {
        self.clear_inheritance_edges();
        self.clear_reference_edges();
        self.state = GraphState::Unlinked;
    }

    fn clear_inheritance_edges(&mut self) {
        for class in self.classes.iter_mut().flatten() {
            class.clear_inheritance_edges();
        }
    }

    fn clear_reference_edges(&mut self) {
        for class in self.classes.iter_mut().flatten() {
            class.clear_reference_edges();
        }
        for method in self.methods.iter_mut().flatten() {
            method.clear_reference_edges();
        }
        for field in self.fields.iter_mut().flatten() {
            field.clear_reference_edges();
        }
    }

    /// Give back every class, in registration order
    pub fn into_models(mut self) -> Vec<ClassModel> {
        let ids = self.all();
        ids.into_iter()
            .filter_map(|id| {
                let class = self.classes.get_mut(id.0)?.take()?;
                let methods = class
                    .methods
                    .iter()
                    .filter_map(|id| self.methods.get_mut(id.0)?.take())
                    .map(MethodData::into_model)
                    .collect();
                let fields = class
                    .fields
                    .iter()
                    .filter_map(|id| self.fields.get_mut(id.0)?.take())
                    .map(FieldData::into_model)
                    .collect();
                Some(ClassModel {
                    name: class.name,
                    super_name: class.super_name,
                    interfaces: class.interfaces,
                    access_flags: class.access_flags,
                    methods,
                    fields,
                })
            })
            .collect()
    }

    fn class_slot(&mut self, id: ClassId) -> Option<&mut ClassData> {
        self.classes.get_mut(id.0)?.as_mut()
    }

    fn method_slot(&mut self, id: MethodId) -> Option<&mut MethodData> {
        self.methods.get_mut(id.0)?.as_mut()
    }

    fn field_slot(&mut self, id: FieldId) -> Option<&mut FieldData> {
        self.fields.get_mut(id.0)?.as_mut()
    }
}

impl Default for ClassPool {
    fn default() -> ClassPool {
        ClassPool::new()
    }
}

/// Remove every occurrence of an id from an edge list
fn prune<T: PartialEq>(edges: &mut Vec<T>, id: T) {
    edges.retain(|edge| *edge != id);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::code::Instruction;
    use crate::jvm::model::{FieldModel, MethodModel};
    use crate::jvm::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags, Name};

    fn name(name: &str) -> BinaryName {
        BinaryName::from_string(name.to_owned()).unwrap()
    }

    fn class(class_name: &str) -> ClassModel {
        ClassModel::new(
            name(class_name),
            Some(BinaryName::OBJECT),
            ClassAccessFlags::PUBLIC,
        )
    }

    #[test]
    fn register_and_lookup() {
        let mut pool = ClassPool::new();
        let a = pool.register(
            class("a/A")
                .with_method(MethodModel::parse("run", "()V", MethodAccessFlags::PUBLIC).unwrap())
                .with_field(FieldModel::parse("count", "I", FieldAccessFlags::PRIVATE).unwrap()),
        );
        let b = pool.register(class("a/B"));

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.all(), vec![a, b]);
        assert_eq!(pool.lookup(&name("a/A")), Some(a));
        assert!(!pool.contains(&name("a/C")));
        assert_eq!(pool.state(), GraphState::Unlinked);

        let run = pool.methods_of(a).next().unwrap();
        assert_eq!(run.identifier(), "a/A.run()V");
        assert_eq!(run.owner(), a);
        let count = pool.fields_of(a).next().unwrap();
        assert_eq!(count.identifier(), "a/A.count");
        assert!(count.is_private());

        assert_eq!(pool.find_class(|class| class.name().simple_name() == "B"), Some(b));
    }

    #[test]
    fn replace_by_name() {
        let mut pool = ClassPool::new();
        let first = pool.register(class("a/A"));
        let second = pool.register(
            class("a/A")
                .with_method(MethodModel::parse("run", "()V", MethodAccessFlags::PUBLIC).unwrap()),
        );

        assert_ne!(first, second);
        assert_eq!(pool.len(), 1);
        assert!(pool.class(first).is_none());
        assert_eq!(pool.class(second).unwrap().methods().len(), 1);
    }

    #[test]
    fn unregister_gives_back_the_model() {
        let mut pool = ClassPool::new();
        let model = class("a/A").with_method(
            MethodModel::parse("run", "()V", MethodAccessFlags::PUBLIC)
                .unwrap()
                .with_code(vec![Instruction::Return]),
        );
        let id = pool.register(model.clone());
        let method = pool.class(id).unwrap().methods()[0];

        let returned = pool.unregister(id).unwrap();
        assert_eq!(returned, model);
        assert!(pool.is_empty());
        assert!(pool.method(method).is_none());
        assert!(pool.unregister(id).is_none());
        assert!(pool.unregister_named(&name("a/A")).is_none());
    }

    #[test]
    fn resolver_requires_linking() {
        let mut pool = ClassPool::new();
        pool.register(class("a/A"));
        assert!(matches!(pool.resolver(), Err(Error::GraphNotLinked)));

        pool.link().unwrap();
        assert!(pool.resolver().is_ok());

        pool.register(class("a/B"));
        assert!(matches!(pool.resolver(), Err(Error::GraphNotLinked)));
    }

    #[test]
    fn into_models_keeps_registration_order() {
        let mut pool = ClassPool::new();
        pool.register(class("z/Z"));
        pool.register(class("a/A"));
        let names: Vec<String> = pool
            .into_models()
            .into_iter()
            .map(|model| model.name.as_str().to_owned())
            .collect();
        assert_eq!(names, vec!["z/Z", "a/A"]);
    }
}
