//! Wren semantic analysis: declaration table, type resolution, generic
//! instantiation and trait conformance.

pub mod analyzer;
pub mod conformance;
pub mod cycles;
pub mod decl_table;
pub mod decls;
pub mod diagnostics;
pub mod errors;
pub mod generic;
pub mod resolve;
pub mod type_kind;

#[cfg(test)]
pub(crate) mod test_utils;

pub use analyzer::{AnalysisOutput, analyze};
pub use conformance::{ConformanceError, check_conformance};
pub use decl_table::{DeclRef, DeclTable, FileUnit};
pub use decls::{Alias, Field, Fn, GenericParam, Signature, Struct, Trait, TypeSymbol, canonical_name};
pub use diagnostics::Diagnostics;
pub use errors::{SemanticError, TypeError};
pub use generic::{CacheStats, InstanceCache, InstantiateError, MAX_INSTANTIATION_DEPTH};
pub use resolve::{GenericScope, Resolver, SubstitutionContext};
pub use type_kind::{FieldIns, StructIns, TypeKind, TypeKindVec};
