//! Mutable tree representation of JVM classes
//!
//! The interesting part is [`code`], which holds method bodies as lists of instruction nodes that
//! can be edited in place. [`model`] wraps those into methods, fields, classes, and modules.
//!
//! ```
//! use insn_tree::jvm::code::{InsnArena, InsnList, InsnNode};
//! use insn_tree::jvm::Opcode;
//!
//! let mut arena = InsnArena::new();
//! let mut list = InsnList::new(&mut arena);
//! let start = arena.new_label();
//! let load = arena.alloc(InsnNode::var(Opcode::ILOAD, 0));
//! let branch = arena.alloc(InsnNode::jump(Opcode::IFNE, start));
//! list.append(&mut arena, start.insn());
//! list.append(&mut arena, load);
//! list.append(&mut arena, branch);
//!
//! assert_eq!(list.index_of(&arena, branch), 2);
//! list.remove(&mut arena, start.insn());
//! assert_eq!(list.index_of(&arena, branch), 1);
//! ```

mod access_flags;
pub mod code;
mod constants;
mod errors;
pub mod model;
mod opcodes;
mod version;

pub use access_flags::*;
pub use constants::*;
pub use errors::*;
pub use opcodes::*;
pub use version::*;
