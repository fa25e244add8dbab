//! Attribute handling
//!
//! Raw caller attributes arrive as an [`AttributeTree`]; the
//! [`AttributeResolver`] merges them over the built-in defaults for the
//! target platform and produces the immutable [`ResolvedConfig`] every later
//! stage of a convergence run consumes.

mod defaults;
mod resolved;
mod resolver;
mod tree;

pub use defaults::default_attributes;
pub use resolved::{
    FileInput, ImfileConfig, MessageSize, Provenance, ResolvedConfig, SizeUnit, TypeMismatch,
};
pub use resolver::AttributeResolver;
pub use tree::{Attr, AttributeTree};
