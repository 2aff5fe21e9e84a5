//! Method bodies: the symbolic instruction set and instruction lists whose elements keep a
//! stable identity while the list is edited.

mod instructions;
mod list;
pub mod opcodes;

pub use instructions::*;
pub use list::*;
