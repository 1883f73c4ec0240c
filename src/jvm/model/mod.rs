//! Containers for the contents of a class: the class itself, its fields and methods, its module
//! declaration, and the annotations on all of those

mod annotation;
mod class;
mod field;
mod method;
mod module;
mod visitor;

pub use annotation::*;
pub use class::*;
pub use field::*;
pub use method::*;
pub use module::*;
pub use visitor::*;
