//! Shared identities for the wren compiler crates.
//!
//! Defines Span, entity ids and the builtin primitive types as the
//! foundational primitives every other crate builds on.

mod entities;
mod primitive_type;
mod span;

pub use entities::{AliasId, FieldId, FileId, FnId, StructId, TraitId};
pub use primitive_type::PrimitiveType;
pub use span::Span;
