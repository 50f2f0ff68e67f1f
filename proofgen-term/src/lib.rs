#![forbid(unsafe_code)]

pub mod common;
pub mod decl;
pub mod namer;
pub mod render;
pub mod term;
pub mod ty;
pub mod visit;

pub use decl::*;
pub use namer::UniqueNamer;
pub use term::*;
pub use ty::*;
pub use visit::*;
