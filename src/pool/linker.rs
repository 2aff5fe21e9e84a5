use super::{ClassId, ClassPool, GraphState};
use crate::jvm::Error;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl ClassPool {
    /// Resolve superclass and interface names into inheritance edges
    ///
    /// Names that are not in the pool are left unlinked. All derived edges are dropped first, so
    /// references need to be indexed again afterwards. If the declarations contain a cycle, the
    /// inheritance edges are dropped again and the pool stays unlinked.
    pub fn link(&mut self) -> Result<(), Error> {
        self.rebuild();

        let mut superclass_edges = 0;
        let mut interface_edges = 0;
        let ids = self.all();
        for id in ids {
            let (super_name, interfaces) = match self.class(id) {
                Some(class) => (class.super_name.clone(), class.interfaces.clone()),
                None => continue,
            };

            if let Some(super_name) = super_name {
                match self.lookup(&super_name) {
                    Some(parent) => {
                        if let Some(class) = self.class_slot(id) {
                            class.parent = Some(parent);
                        }
                        if let Some(parent) = self.class_slot(parent) {
                            parent.children.push(id);
                        }
                        superclass_edges += 1;
                    }
                    None => log::trace!("Superclass {} of {:?} is not in the pool", super_name, id),
                }
            }

            for interface_name in interfaces {
                let interface = match self.lookup(&interface_name) {
                    Some(interface) => interface,
                    None => {
                        log::trace!("Interface {} of {:?} is not in the pool", interface_name, id);
                        continue;
                    }
                };
                let added = match self.class_slot(id) {
                    Some(class) if !class.interface_classes.contains(&interface) => {
                        class.interface_classes.push(interface);
                        true
                    }
                    _ => false,
                };
                if added {
                    if let Some(interface) = self.class_slot(interface) {
                        interface.implementers.push(id);
                    }
                    interface_edges += 1;
                }
            }
        }

        let cyclic = self
            .find_inheritance_cycle()
            .and_then(|id| self.class(id))
            .map(|class| class.name.clone());
        if let Some(name) = cyclic {
            log::warn!("Inheritance cycle through {}", name);
            self.rebuild();
            return Err(Error::CyclicInheritance(name));
        }

        log::debug!(
            "Linked {} classes ({} superclass edges, {} interface edges)",
            self.len(),
            superclass_edges,
            interface_edges
        );
        self.state = GraphState::Linked;
        Ok(())
    }

    /// Find a class that is its own (transitive) supertype
    ///
    /// This is a depth-first search over superclass and interface edges together.
    fn find_inheritance_cycle(&self) -> Option<ClassId> {
        let mut marks = vec![Mark::Unvisited; self.classes.len()];

        for root in self.all() {
            if marks[root.0] != Mark::Unvisited {
                continue;
            }
            marks[root.0] = Mark::InProgress;
            let mut stack: Vec<(ClassId, Vec<ClassId>, usize)> =
                vec![(root, self.direct_supertypes(root), 0)];

            while let Some((id, supertypes, next)) = stack.last_mut() {
                let id = *id;
                let supertype = supertypes.get(*next).copied();
                *next += 1;
                match supertype {
                    None => {
                        marks[id.0] = Mark::Done;
                        stack.pop();
                    }
                    Some(supertype) => match marks[supertype.0] {
                        Mark::InProgress => return Some(supertype),
                        Mark::Done => (),
                        Mark::Unvisited => {
                            marks[supertype.0] = Mark::InProgress;
                            stack.push((supertype, self.direct_supertypes(supertype), 0));
                        }
                    },
                }
            }
        }

        None
    }

    fn direct_supertypes(&self, id: ClassId) -> Vec<ClassId> {
        match self.class(id) {
            Some(class) => class
                .parent
                .into_iter()
                .chain(class.interface_classes.iter().copied())
                .collect(),
            None => vec![],
        }
    }
}
