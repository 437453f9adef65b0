//! ORC schema handling
//!
//! This module provides the type tree that drives decoder construction:
//! every column in a file has a [`TypeKind`] and a stable column id assigned
//! by pre-order traversal, and composite types own their children.
//!
//! Type trees can be built programmatically or parsed from the compact
//! type-string syntax, e.g. `struct<a:int,b:decimal(10,2),c:array<string>>`.

mod parser;
mod types;

pub use parser::parse_type;
pub use types::{OrcType, TypeKind};
