//! Matching and rewriting of instruction sequences
//!
//! An [`InstructionMatcher`] holds an ordered list of [`Step`]s. Scanning an instruction list
//! looks for a contiguous run of instructions that satisfy the steps in order, capturing each
//! matched instruction. Rewrites (replacements, removals, and instructions to insert after the
//! span) are queued against the captures and only applied when [`InstructionMatcher::replace`]
//! commits them, so the captures can be inspected first.
//!
//! ```
//! use classpool::jvm::code::{opcodes, Instruction, InstructionList};
//! use classpool::matcher::{InstructionMatcher, OpcodeStep};
//!
//! # fn main() -> Result<(), classpool::jvm::Error> {
//! let mut list = InstructionList::from(vec![
//!     Instruction::ILoad(0),
//!     Instruction::Nop,
//!     Instruction::IReturn,
//! ]);
//!
//! let mut matcher = InstructionMatcher::new();
//! let nop = matcher.add_step(OpcodeStep::new(&[opcodes::NOP]))?;
//!
//! let mut cursor = list.cursor();
//! assert!(matcher.find(&mut cursor)?);
//! matcher.add_removal(nop)?;
//! assert!(matcher.replace(&mut cursor)?);
//! assert_eq!(list.len(), 2);
//! # Ok(())
//! # }
//! ```

mod matcher;
mod step;

pub use matcher::*;
pub use step::*;
