use super::Instruction;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSN_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of an instruction inside an [`InstructionList`]
///
/// Every instruction gets a fresh identity when it is put into a list, so two `nop`s are never
/// the same instruction even though they compare equal. Identities are unique for the lifetime of
/// the process.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct InsnId(u64);

impl InsnId {
    fn fresh() -> InsnId {
        InsnId(NEXT_INSN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for InsnId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_fmt(format_args!("#{}", self.0))
    }
}

/// Instruction along with its identity
#[derive(Clone, Debug, PartialEq)]
pub struct InsnNode {
    pub id: InsnId,
    pub insn: Instruction,
}

impl InsnNode {
    pub fn new(insn: Instruction) -> InsnNode {
        InsnNode {
            id: InsnId::fresh(),
            insn,
        }
    }
}

/// Ordered, editable body of a method
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstructionList {
    nodes: Vec<InsnNode>,
}

impl InstructionList {
    pub fn new() -> InstructionList {
        InstructionList { nodes: vec![] }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append an instruction, returning its fresh identity
    pub fn push(&mut self, insn: Instruction) -> InsnId {
        let node = InsnNode::new(insn);
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn get(&self, index: usize) -> Option<&InsnNode> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InsnNode> {
        self.nodes.iter()
    }

    /// Instructions (without their identities) in order
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.nodes.iter().map(|node| &node.insn)
    }

    /// Position of an instruction in the list
    pub fn position(&self, id: InsnId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    /// Identity of the instruction that follows the given one
    pub fn next_id(&self, id: InsnId) -> Option<InsnId> {
        let index = self.position(id)?;
        self.nodes.get(index + 1).map(|node| node.id)
    }

    /// Cursor positioned before the first instruction
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor {
            list: self,
            position: 0,
        }
    }

    /// Cursor positioned before the instruction at `position` (clamped to the end of the list)
    pub fn cursor_at(&mut self, position: usize) -> Cursor<'_> {
        let position = position.min(self.nodes.len());
        Cursor {
            list: self,
            position,
        }
    }
}

impl FromIterator<Instruction> for InstructionList {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        InstructionList {
            nodes: iter.into_iter().map(InsnNode::new).collect(),
        }
    }
}

impl From<Vec<Instruction>> for InstructionList {
    fn from(insns: Vec<Instruction>) -> Self {
        insns.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a InstructionList {
    type Item = &'a InsnNode;
    type IntoIter = std::slice::Iter<'a, InsnNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Position between two instructions of a list, through which the list can be edited
///
/// The position `n` sits just before the instruction at index `n` (so `0` is before the first
/// instruction and `len` is after the last one).
pub struct Cursor<'l> {
    list: &'l mut InstructionList,
    position: usize,
}

impl<'l> Cursor<'l> {
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor (clamped to the end of the list)
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.list.nodes.len());
    }

    pub fn has_next(&self) -> bool {
        self.position < self.list.nodes.len()
    }

    /// Instruction right after the cursor
    pub fn peek(&self) -> Option<&InsnNode> {
        self.list.nodes.get(self.position)
    }

    /// Step over the next instruction, returning it
    pub fn advance(&mut self) -> Option<&InsnNode> {
        let node = self.list.nodes.get(self.position)?;
        self.position += 1;
        Some(node)
    }

    /// Insert an instruction at the cursor and step over it
    pub fn insert(&mut self, insn: Instruction) -> InsnId {
        let node = InsnNode::new(insn);
        let id = node.id;
        self.list.nodes.insert(self.position, node);
        self.position += 1;
        id
    }

    /// Remove the instruction right after the cursor
    pub fn remove(&mut self) -> Option<InsnNode> {
        if self.has_next() {
            Some(self.list.nodes.remove(self.position))
        } else {
            None
        }
    }

    /// Overwrite the instruction right after the cursor (it gets a fresh identity)
    ///
    /// Returns the overwritten instruction, or `None` (and does nothing) at the end of the list.
    pub fn set(&mut self, insn: Instruction) -> Option<InsnNode> {
        let slot = self.list.nodes.get_mut(self.position)?;
        Some(std::mem::replace(slot, InsnNode::new(insn)))
    }

    /// List being edited
    pub fn list(&self) -> &InstructionList {
        self.list
    }
}
