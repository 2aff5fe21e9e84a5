//! Cross-referenced symbol graph and instruction pattern matching for JVM classes
//!
//! Classes come in as [`jvm::model::ClassModel`]s (produced by whatever reads class files) and
//! get registered into a [`pool::ClassPool`]. Linking the pool resolves the inheritance graph,
//! and indexing it resolves every call, field access, and class reference in every method body
//! to the member it targets, following the JVM's own lookup rules (including the selection of
//! maximally-specific default methods).
//!
//! Method bodies can then be rewritten with an [`matcher::InstructionMatcher`], which finds runs
//! of instructions satisfying a sequence of steps and commits replacements against them.
//!
//! ### Example
//!
//! ```
//! use classpool::jvm::model::{ClassModel, MethodModel};
//! use classpool::jvm::code::{Instruction, InvokeType, MethodRef};
//! use classpool::jvm::*;
//! use classpool::pool::ClassPool;
//!
//! # fn build() -> Result<(), Error> {
//! let greeter = BinaryName::from_string(String::from("me/Greeter")).map_err(Error::MalformedName)?;
//! let hello = MethodModel::parse("hello", "()V", MethodAccessFlags::PUBLIC)?;
//! let main = MethodModel::parse(
//!     "main",
//!     "()V",
//!     MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
//! )?
//! .with_code(vec![
//!     Instruction::New(greeter.clone()),
//!     Instruction::Invoke(
//!         InvokeType::Virtual,
//!         MethodRef {
//!             owner: greeter.clone(),
//!             name: hello.name.clone(),
//!             descriptor: hello.descriptor.clone(),
//!             is_interface: false,
//!         },
//!     ),
//!     Instruction::Return,
//! ]);
//!
//! let mut pool = ClassPool::new();
//! let class = pool.register(
//!     ClassModel::new(greeter, Some(BinaryName::OBJECT), ClassAccessFlags::PUBLIC)
//!         .with_method(hello)
//!         .with_method(main),
//! );
//! let stats = pool.process_refs()?;
//! assert_eq!(stats.calls, 1);
//!
//! let methods = pool.class(class).unwrap().methods();
//! assert_eq!(pool.method(methods[0]).unwrap().refs_in(), &[methods[1]]);
//! # Ok(())
//! # }
//! # build().unwrap();
//! ```

pub mod analysis;
pub mod jvm;
pub mod matcher;
pub mod pool;
