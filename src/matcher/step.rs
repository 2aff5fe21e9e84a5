use crate::analysis::{ExecutionTrace, Frame};
use crate::jvm::code::{InsnNode, Instruction};

/// Condition on a single instruction
pub trait Step {
    /// Does the instruction satisfy the condition?
    fn test(&self, node: &InsnNode) -> bool;
}

/// Matches instructions whose opcode is in a set
///
/// Pseudo-instructions (labels, line numbers) have no opcode and never match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpcodeStep {
    opcodes: Vec<u8>,
}

impl OpcodeStep {
    pub fn new(opcodes: &[u8]) -> OpcodeStep {
        let mut opcodes = opcodes.to_vec();
        opcodes.sort_unstable();
        opcodes.dedup();
        OpcodeStep { opcodes }
    }

    /// Matches every opcode from `start` to `end` (both inclusive)
    ///
    /// Panics if `start >= end`.
    pub fn range(start: u8, end: u8) -> OpcodeStep {
        OpcodeStep::range_with(start, end, &[])
    }

    /// Matches every opcode from `start` to `end` (both inclusive), plus some extra opcodes
    ///
    /// Panics if `start >= end`.
    pub fn range_with(start: u8, end: u8, extra: &[u8]) -> OpcodeStep {
        assert!(start < end, "opcode range {}..={} is empty", start, end);
        let mut opcodes: Vec<u8> = (start..=end).collect();
        opcodes.extend_from_slice(extra);
        OpcodeStep::new(&opcodes)
    }

    pub fn contains(&self, opcode: u8) -> bool {
        self.opcodes.binary_search(&opcode).is_ok()
    }

    pub fn opcodes(&self) -> &[u8] {
        &self.opcodes
    }
}

impl Step for OpcodeStep {
    fn test(&self, node: &InsnNode) -> bool {
        node.insn
            .opcode()
            .map_or(false, |opcode| self.contains(opcode))
    }
}

/// Matches instructions satisfying an arbitrary predicate
pub struct PredicateStep<F> {
    predicate: F,
}

impl<F: Fn(&Instruction) -> bool> PredicateStep<F> {
    pub fn new(predicate: F) -> PredicateStep<F> {
        PredicateStep { predicate }
    }
}

impl<F: Fn(&Instruction) -> bool> Step for PredicateStep<F> {
    fn test(&self, node: &InsnNode) -> bool {
        (self.predicate)(&node.insn)
    }
}

/// Matches instructions based on the frame before them
///
/// Instructions without a frame in the trace (eg. unreachable code, or instructions inserted
/// after the trace was computed) never match.
pub struct FrameStep<'t, V, F> {
    trace: &'t ExecutionTrace<V>,
    predicate: F,
}

impl<'t, V, F: Fn(&Instruction, &Frame<V>) -> bool> FrameStep<'t, V, F> {
    pub fn new(trace: &'t ExecutionTrace<V>, predicate: F) -> FrameStep<'t, V, F> {
        FrameStep { trace, predicate }
    }
}

impl<'t, V, F: Fn(&Instruction, &Frame<V>) -> bool> Step for FrameStep<'t, V, F> {
    fn test(&self, node: &InsnNode) -> bool {
        self.trace
            .frame(node.id)
            .map_or(false, |frame| (self.predicate)(&node.insn, frame))
    }
}
