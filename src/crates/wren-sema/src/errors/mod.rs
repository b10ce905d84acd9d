// errors/mod.rs
//! Semantic analysis errors: resolution and declaration (E20xx),
//! trait conformance (E21xx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use wren_identity::{FileId, Span};

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("unknown type '{name}'")]
    #[diagnostic(code(E2001))]
    UnknownType {
        name: String,
        #[label("not a known struct, alias or primitive")]
        span: SourceSpan,
    },

    #[error("expected {expected} type arguments for '{name}', found {found}")]
    #[diagnostic(code(E2002))]
    WrongTypeArgCount {
        name: String,
        expected: usize,
        found: usize,
        #[label("wrong number of type arguments")]
        span: SourceSpan,
    },

    #[error("type parameter '{name}' cannot take type arguments")]
    #[diagnostic(code(E2003))]
    TypeParamWithArgs {
        name: String,
        #[label("type arguments on a type parameter")]
        span: SourceSpan,
    },

    #[error("type '{name}' does not take type arguments")]
    #[diagnostic(code(E2004))]
    UnexpectedTypeArgs {
        name: String,
        #[label("remove the type arguments")]
        span: SourceSpan,
    },

    #[error("'Self' is only valid inside trait and impl signatures")]
    #[diagnostic(code(E2005))]
    SelfOutsideImpl {
        #[label("'Self' used here")]
        span: SourceSpan,
    },

    #[error("type alias '{name}' refers to itself")]
    #[diagnostic(code(E2006), help("cycle: {path}"))]
    AliasCycle {
        name: String,
        path: String,
        #[label("alias is part of a cycle")]
        span: SourceSpan,
    },

    #[error("'{name}' is declared more than once")]
    #[diagnostic(code(E2007), help("type and trait names share one namespace"))]
    DuplicateDeclaration {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
    },

    #[error("'{name}' is a builtin type name")]
    #[diagnostic(code(E2008))]
    ReservedTypeName {
        name: String,
        #[label("cannot redefine a primitive")]
        span: SourceSpan,
    },

    #[error("field '{field}' is declared more than once in '{struct_name}'")]
    #[diagnostic(code(E2009))]
    DuplicateField {
        struct_name: String,
        field: String,
        #[label("duplicate field")]
        span: SourceSpan,
        #[label("first declared here")]
        first: SourceSpan,
    },

    #[error("type parameter '{name}' is declared more than once")]
    #[diagnostic(code(E2010))]
    DuplicateTypeParam {
        name: String,
        #[label("duplicate type parameter")]
        span: SourceSpan,
    },

    #[error("cannot implement methods for unknown struct '{name}'")]
    #[diagnostic(code(E2011))]
    UnknownImplTarget {
        name: String,
        #[label("not a known struct")]
        span: SourceSpan,
    },

    #[error("unknown trait '{name}'")]
    #[diagnostic(code(E2012))]
    UnknownTrait {
        name: String,
        #[label("not a known trait")]
        span: SourceSpan,
    },

    #[error("'{type_name}' already implements '{trait_name}'")]
    #[diagnostic(code(E2013))]
    DuplicateImpl {
        type_name: String,
        trait_name: String,
        #[label("second implementation")]
        span: SourceSpan,
    },

    #[error("struct '{name}' contains itself by value")]
    #[diagnostic(
        code(E2014),
        help("cycle: {path}\nbreak the cycle with a pointer, reference or slice field")
    )]
    IllegalCycle {
        name: String,
        path: String,
        #[label("infinitely sized struct")]
        span: SourceSpan,
    },

    #[error("trait '{name}' cannot be used as a type")]
    #[diagnostic(code(E2015))]
    TraitAsType {
        name: String,
        #[label("expected a type")]
        span: SourceSpan,
    },

    #[error("instantiating '{name}' never reaches a fixed set of types")]
    #[diagnostic(
        code(E2016),
        help("each instance asks for a new one with larger type arguments; stopped after {limit} levels")
    )]
    InstantiationTooDeep {
        name: String,
        limit: u32,
        #[label("grows its type arguments here")]
        span: SourceSpan,
    },

    #[error("'{type_name}' does not implement method '{method}' required by '{trait_name}'")]
    #[diagnostic(code(E2101))]
    TraitNotSatisfied {
        type_name: String,
        trait_name: String,
        method: String,
        #[label("declared to implement {trait_name}")]
        span: SourceSpan,
    },

    #[error("method '{method}' has wrong signature for trait '{trait_name}'")]
    #[diagnostic(code(E2102), help("trait requires: {expected}\nfound: {found}"))]
    TraitSignatureMismatch {
        trait_name: String,
        method: String,
        expected: String,
        found: String,
        #[label("signature mismatch")]
        span: SourceSpan,
    },
}

/// A semantic error with the file and span it was reported at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub error: SemanticError,
    pub span: Span,
    pub file: FileId,
}

impl TypeError {
    pub fn new(error: SemanticError, span: Span, file: FileId) -> Self {
        Self { error, span, file }
    }
}
