use super::{ClassId, ClassPool, FieldId, GraphState, MethodId, Resolver};
use crate::jvm::code::{Constant, Instruction};
use crate::jvm::{BinaryName, Error};

/// Counts of what an indexing pass recorded
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Call sites resolved to a method in the pool
    pub calls: usize,

    /// Field reads resolved to a field in the pool
    pub field_reads: usize,

    /// Field writes resolved to a field in the pool
    pub field_writes: usize,

    /// Class references from type instructions
    pub type_refs: usize,

    /// String constants collected
    pub strings: usize,

    /// Fields whose declared type is a class in the pool
    pub field_types: usize,

    /// References whose target is not in the pool
    pub skipped: usize,
}

/// Edge discovered while walking the code, recorded once the walk is over
enum Edge {
    Call(MethodId, MethodId),
    Read(MethodId, FieldId),
    Write(MethodId, FieldId),
    Type(MethodId, ClassId),
    String(ClassId, String),
    FieldType(FieldId, ClassId),
}

impl ClassPool {
    /// Walk every method body and record the calls, field accesses, and class references it makes
    ///
    /// Reference edges from a previous run are dropped first. Targets that do not resolve to a
    /// member of the pool are skipped.
    pub fn index_refs(&mut self) -> Result<IndexStats, Error> {
        if self.state == GraphState::Unlinked {
            return Err(Error::GraphNotLinked);
        }
        self.clear_reference_edges();

        let mut stats = IndexStats::default();
        let edges = collect_edges(&self.resolver()?, &mut stats);
        for edge in edges {
            self.record(edge);
        }

        log::debug!("Indexed references of {} classes: {:?}", self.len(), stats);
        self.state = GraphState::Indexed;
        Ok(stats)
    }

    fn record(&mut self, edge: Edge) {
        match edge {
            Edge::Call(caller, callee) => {
                let owner = self.method(callee).map(|callee| callee.owner);
                if let Some(callee) = self.method_slot(callee) {
                    callee.refs_in.push(caller);
                }
                if let Some(caller) = self.method_slot(caller) {
                    caller.refs_out.push(callee);
                }
                if let Some(owner) = owner {
                    self.record(Edge::Type(caller, owner));
                }
            }
            Edge::Read(method, field) => {
                let owner = self.field(field).map(|field| field.owner);
                if let Some(field) = self.field_slot(field) {
                    field.read_refs.push(method);
                }
                if let Some(method) = self.method_slot(method) {
                    method.field_read_refs.push(field);
                }
                if let Some(owner) = owner {
                    self.record(Edge::Type(method, owner));
                }
            }
            Edge::Write(method, field) => {
                let owner = self.field(field).map(|field| field.owner);
                if let Some(field) = self.field_slot(field) {
                    field.write_refs.push(method);
                }
                if let Some(method) = self.method_slot(method) {
                    method.field_write_refs.push(field);
                }
                if let Some(owner) = owner {
                    self.record(Edge::Type(method, owner));
                }
            }
            Edge::Type(method, class) => {
                if let Some(class) = self.class_slot(class) {
                    class.method_type_refs.push(method);
                }
                if let Some(method) = self.method_slot(method) {
                    method.class_refs.push(class);
                }
            }
            Edge::String(class, string) => {
                if let Some(class) = self.class_slot(class) {
                    class.strings.push(string);
                }
            }
            Edge::FieldType(field, class) => {
                if let Some(class) = self.class_slot(class) {
                    class.field_type_refs.push(field);
                }
            }
        }
    }
}

fn collect_edges(resolver: &Resolver<'_>, stats: &mut IndexStats) -> Vec<Edge> {
    let pool = resolver.pool();
    let settings = pool.settings();
    let mut edges = vec![];

    for class in pool.classes() {
        for method in pool.methods_of(class.id) {
            let caller = method.id;
            for insn in method.instructions.instructions() {
                match insn {
                    Instruction::Invoke(_, method_ref) => {
                        let resolved = resolver.resolve_method_named(
                            &method_ref.owner,
                            &method_ref.name,
                            &method_ref.descriptor,
                            method_ref.is_interface,
                        );
                        match resolved {
                            Some(callee) => {
                                edges.push(Edge::Call(caller, callee));
                                stats.calls += 1;
                            }
                            None => {
                                log::trace!(
                                    "Skipping call to {}.{} from {}",
                                    method_ref.owner,
                                    method_ref.name,
                                    method.identifier()
                                );
                                stats.skipped += 1;
                            }
                        }
                    }

                    Instruction::GetField(field_ref)
                    | Instruction::GetStatic(field_ref)
                    | Instruction::PutField(field_ref)
                    | Instruction::PutStatic(field_ref) => {
                        let resolved = resolver.resolve_field_named(
                            &field_ref.owner,
                            &field_ref.name,
                            &field_ref.descriptor,
                        );
                        let is_write =
                            matches!(insn, Instruction::PutField(_) | Instruction::PutStatic(_));
                        match resolved {
                            Some(field) if is_write => {
                                edges.push(Edge::Write(caller, field));
                                stats.field_writes += 1;
                            }
                            Some(field) => {
                                edges.push(Edge::Read(caller, field));
                                stats.field_reads += 1;
                            }
                            None => {
                                log::trace!(
                                    "Skipping access to {}.{} from {}",
                                    field_ref.owner,
                                    field_ref.name,
                                    method.identifier()
                                );
                                stats.skipped += 1;
                            }
                        }
                    }

                    Instruction::New(class_name) if settings.index_type_references => {
                        type_ref(pool, caller, Some(class_name), &mut edges, stats);
                    }
                    Instruction::ANewArray(ref_type)
                    | Instruction::CheckCast(ref_type)
                    | Instruction::InstanceOf(ref_type)
                    | Instruction::MultiANewArray(ref_type, _)
                        if settings.index_type_references =>
                    {
                        type_ref(pool, caller, ref_type.class(), &mut edges, stats);
                    }

                    Instruction::Ldc(Constant::String(string)) if settings.collect_strings => {
                        edges.push(Edge::String(class.id, string.clone()));
                        stats.strings += 1;
                    }

                    _ => (),
                }
            }
        }

        if settings.index_field_types {
            for field in pool.fields_of(class.id) {
                let type_class = field.descriptor.class().and_then(|name| pool.lookup(name));
                if let Some(type_class) = type_class {
                    edges.push(Edge::FieldType(field.id, type_class));
                    stats.field_types += 1;
                }
            }
        }
    }

    edges
}

/// Reference to a class from a type instruction (primitive arrays reference nothing)
fn type_ref(
    pool: &ClassPool,
    method: MethodId,
    class_name: Option<&BinaryName>,
    edges: &mut Vec<Edge>,
    stats: &mut IndexStats,
) {
    let class_name = match class_name {
        Some(class_name) => class_name,
        None => return,
    };
    match pool.lookup(class_name) {
        Some(class) => {
            edges.push(Edge::Type(method, class));
            stats.type_refs += 1;
        }
        None => {
            log::trace!("Skipping reference to {}", class_name);
            stats.skipped += 1;
        }
    }
}
