// src/errors/parser.rs
//! Parser errors (E1xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("expected {expected}, found '{found}'")]
    #[diagnostic(code(E1002))]
    ExpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("unexpected token '{token}'")]
    #[diagnostic(code(E1003))]
    UnexpectedToken {
        token: String,
        #[label("unexpected")]
        span: SourceSpan,
    },

    #[error("expected type, found '{found}'")]
    #[diagnostic(code(E1004))]
    ExpectedType {
        found: String,
        #[label("expected type")]
        span: SourceSpan,
    },

    #[error("expected declaration, found '{found}'")]
    #[diagnostic(
        code(E1005),
        help("top-level items are struct, trait, impl, type and fn declarations")
    )]
    ExpectedDeclaration {
        found: String,
        #[label("expected a declaration")]
        span: SourceSpan,
    },

    #[error("unterminated body")]
    #[diagnostic(code(E1007), help("add the matching '}}'"))]
    UnterminatedBody {
        #[label("body opened here")]
        span: SourceSpan,
    },

    #[error("empty type argument list")]
    #[diagnostic(code(E1008), help("remove the brackets or supply type arguments"))]
    EmptyTypeArgs {
        #[label("no type arguments")]
        span: SourceSpan,
    },

    #[error("directive is not allowed here")]
    #[diagnostic(code(E1009), help("directives can only be attached to struct declarations"))]
    MisplacedDirective {
        #[label("directive attached to a non-struct declaration")]
        span: SourceSpan,
    },

    #[error("receiver must be the first parameter")]
    #[diagnostic(code(E1010))]
    MisplacedReceiver {
        #[label("'self' after other parameters")]
        span: SourceSpan,
    },

    #[error("trait method '{name}' cannot have a body")]
    #[diagnostic(code(E1011), help("provide the body in an impl block instead"))]
    TraitMethodWithBody {
        name: String,
        #[label("body not allowed in a trait")]
        span: SourceSpan,
    },

    #[error("method '{name}' is missing a body")]
    #[diagnostic(code(E1012))]
    MissingBody {
        name: String,
        #[label("expected '{{' here")]
        span: SourceSpan,
    },

    #[error("'cpp' can only mark struct declarations")]
    #[diagnostic(code(E1013))]
    NativeNonStruct {
        #[label("expected 'struct' after 'cpp'")]
        span: SourceSpan,
    },
}
