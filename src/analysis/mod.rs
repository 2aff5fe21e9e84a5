//! Results of dataflow analysis over method bodies
//!
//! Computing frames needs an abstract interpreter, which lives outside of this crate. What lives
//! here is the shape those results are handed over in, keyed by instruction identity so that
//! they survive edits to the instruction list (and can feed [`FrameStep`](crate::matcher::FrameStep)s).

mod frame;
mod trace;

pub use frame::*;
pub use trace::*;
