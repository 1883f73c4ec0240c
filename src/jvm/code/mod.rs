//! Instruction nodes and the lists that hold them
//!
//! Nodes live in an [`InsnArena`] and are addressed through [`InsnId`] handles. An [`InsnList`]
//! threads some of those nodes into a sequence, and lists can be walked, edited through a
//! [`Cursor`], copied with a [`LabelMap`], or replayed to a [`MethodVisitor`].

mod arena;
mod clone;
mod cursor;
mod frame;
mod insn;
mod insn_list;
mod label;
mod visitor;

pub use arena::*;
pub use clone::*;
pub use cursor::*;
pub use frame::*;
pub use insn::*;
pub use insn_list::*;
pub use label::*;
pub use visitor::*;
