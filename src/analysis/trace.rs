use super::Frame;
use crate::jvm::code::{InsnId, InstructionList};
use std::collections::HashMap;

/// Abstract value that remembers which instructions produced it
pub trait TracedValue {
    /// Instructions the value may originate from (several after control flow merges)
    fn origins(&self) -> &[InsnId];
}

/// Instruction that produced a value (the first one, if control flow merged several)
pub fn resolve_origin<V: TracedValue>(value: &V) -> Option<InsnId> {
    value.origins().first().copied()
}

/// Frames of one method body, as computed by an external interpreter
#[derive(Debug, Clone)]
pub struct ExecutionTrace<V> {
    frames: HashMap<InsnId, Frame<V>>,
}

impl<V> ExecutionTrace<V> {
    pub fn new() -> ExecutionTrace<V> {
        ExecutionTrace {
            frames: HashMap::new(),
        }
    }

    /// Record the frame before an instruction (replacing any previous one)
    pub fn insert(&mut self, insn: InsnId, frame: Frame<V>) -> Option<Frame<V>> {
        self.frames.insert(insn, frame)
    }

    /// Frame before an instruction, if the instruction was reached
    pub fn frame(&self, insn: InsnId) -> Option<&Frame<V>> {
        self.frames.get(&insn)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<V: PartialEq> ExecutionTrace<V> {
    /// Values an instruction leaves on the stack
    ///
    /// These are the values on the stack before the following instruction which were not on the
    /// stack before this one. This is empty for the last instruction of the list, and when either
    /// frame is missing.
    pub fn pushed(&self, list: &InstructionList, insn: InsnId) -> Vec<&V> {
        let next = match list.next_id(insn) {
            Some(next) => next,
            None => return vec![],
        };
        match (self.frame(insn), self.frame(next)) {
            (Some(current), Some(following)) => following
                .stack
                .iter()
                .filter(|value| !current.stack.contains(value))
                .collect(),
            _ => vec![],
        }
    }
}

impl<V> Default for ExecutionTrace<V> {
    fn default() -> ExecutionTrace<V> {
        ExecutionTrace::new()
    }
}
