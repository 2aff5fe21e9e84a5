/// Snapshot of the local variables and the operand stack just before an instruction executes
///
/// The value type is left to the interpreter producing the frames. The top of the stack is the
/// last element of `stack`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame<V> {
    /// Local variables in scope
    pub locals: Vec<V>,

    /// Values on the stack
    pub stack: Vec<V>,
}

impl<V> Frame<V> {
    pub fn new(locals: Vec<V>, stack: Vec<V>) -> Frame<V> {
        Frame { locals, stack }
    }

    /// Value at the top of the stack
    pub fn top(&self) -> Option<&V> {
        self.stack.last()
    }

    /// Value `depth` entries below the top of the stack (`0` is the top)
    pub fn peek(&self, depth: usize) -> Option<&V> {
        let index = self.stack.len().checked_sub(depth + 1)?;
        self.stack.get(index)
    }

    pub fn local(&self, index: usize) -> Option<&V> {
        self.locals.get(index)
    }
}
