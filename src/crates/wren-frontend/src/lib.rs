//! Wren frontend: lexer, parser, and declaration AST.

pub mod ast;
pub mod errors;
pub mod lexer;
mod parse_decl;
mod parse_generic;
mod parse_type;
pub mod parser;
pub mod token;

pub use ast::{
    AliasDecl, Decl, Directive, FieldDecl, FuncDecl, Ident, ImplBlock, Param, Program, Receiver,
    StructDecl, TraitDecl, TypeExpr, TypeExprKind, TypeParam,
};
pub use errors::{LexerError, ParserError};
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use token::{Span, Token, TokenType};
