// test_utils.rs
//
// Helpers for building declaration tables from source in unit tests.

use wren_frontend::{Lexer, Parser, Program};
use wren_identity::FileId;

use crate::decl_table::{DeclTable, FileUnit};
use crate::errors::TypeError;

pub(crate) fn parse(source: &str) -> Program {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    assert!(lex_errors.is_empty(), "lexer errors: {lex_errors:?}");
    Parser::new(tokens)
        .parse_program()
        .unwrap_or_else(|errors| panic!("parse errors: {errors:?}"))
}

/// One unit per source, with file ids in order
pub(crate) fn units(sources: &[&str]) -> Vec<FileUnit> {
    sources
        .iter()
        .enumerate()
        .map(|(i, src)| FileUnit::new(FileId::new(i as u32), parse(src)))
        .collect()
}

pub(crate) fn build(sources: &[&str]) -> (DeclTable, Vec<TypeError>) {
    DeclTable::build(&units(sources))
}

/// Build a table from one source that must declare cleanly
pub(crate) fn table_from(source: &str) -> DeclTable {
    let (table, errors) = build(&[source]);
    assert!(errors.is_empty(), "declaration errors: {errors:?}");
    table
}

/// Error kinds by miette code, in report order
pub(crate) fn codes(errors: &[TypeError]) -> Vec<String> {
    use miette::Diagnostic;
    errors
        .iter()
        .map(|e| e.error.code().map(|c| c.to_string()).unwrap_or_default())
        .collect()
}
