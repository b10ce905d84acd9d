use wren_frontend::{Lexer, Parser};
use wren_identity::FileId;
use wren_sema::{AnalysisOutput, FileUnit, analyze};

use super::*;
use crate::config::CANONICAL;

fn analyze_src(source: &str) -> AnalysisOutput {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    assert!(lex_errors.is_empty());
    let program = Parser::new(tokens).parse_program().unwrap();
    analyze(&[FileUnit::new(FileId::new(0), program)])
}

fn emit(source: &str) -> EmitResult {
    let analysis = analyze_src(source);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    emit_program(&analysis, CANONICAL).unwrap()
}

#[test]
fn emits_prelude_forward_decls_and_definitions() {
    let result = emit(
        "/// A point\n\
         struct Point {\n    x: f64\n    /// Cached length\n    mut len: f64\n}\n",
    );
    let expected = "\
// Generated by wren. Do not edit.
#pragma once

#include <any>
#include <cstddef>
#include <cstdint>
#include <string>
#include <vector>

struct Point;

/// A point
struct Point {
    double x;
    /// Cached length
    mutable double len;
};  // Point
";
    assert_eq!(result.output, expected);
    assert_eq!(result.definitions, 1);
}

#[test]
fn generic_instances_get_numbered_names() {
    let result = emit(
        "struct Pair[T, U] { first: T, second: U }\n\
         struct Use { a: Pair[int, str], b: Pair[bool, u8] }\n",
    );
    assert!(result.output.contains("struct Pair_1 {\n    bool first;\n    std::uint8_t second;\n};  // Pair[bool,u8]"));
    assert!(result.output.contains("struct Pair_2 {\n    std::ptrdiff_t first;\n    std::string second;\n};  // Pair[int,str]"));
    assert!(result.output.contains("    Pair_2 a;\n    Pair_1 b;\n"));
    assert_eq!(result.definitions, 3);
}

#[test]
fn value_dependencies_are_defined_first() {
    let result = emit("struct A { b: B, c: *C }\nstruct B { x: int }\nstruct C { a: A }\n");
    let pos = |needle: &str| result.output.find(needle).unwrap();
    assert!(pos("struct B {") < pos("struct A {"));
    assert!(pos("struct A {") < pos("struct C {"));
    assert!(pos("struct C;") < pos("struct A {"));
}

#[test]
fn native_structs_are_referenced_not_defined() {
    let result = emit(
        "#include <memory>\n\
         cpp struct Handle[T] { raw: *T }\n\
         struct Owner { h: Handle[int], hs: []*Handle[str] }\n",
    );
    assert!(result.output.contains("#include <memory>\n"));
    assert!(!result.output.contains("struct Handle"));
    assert!(result.output.contains("    Handle<std::ptrdiff_t> h;\n    std::vector<Handle<std::string>*> hs;\n"));
    assert_eq!(result.definitions, 1);
}

#[test]
fn generated_names_avoid_declared_ones() {
    let result = emit(
        "struct Box[T] { v: T }\n\
         struct Box_1 { b: Box[int] }\n",
    );
    assert!(result.output.contains("struct Box_2 {\n    std::ptrdiff_t v;\n};  // Box[int]"));
    assert!(result.output.contains("    Box_2 b;\n"));
}

#[test]
fn empty_struct_is_one_line() {
    let result = emit("struct Unit {}");
    assert!(result.output.ends_with("struct Unit {};  // Unit\n"));
}

#[test]
fn refuses_failed_analysis() {
    let analysis = analyze_src("struct S { x: Missing }");
    assert!(matches!(emit_program(&analysis, CANONICAL), Err(EmitError::AnalysisFailed(1))));
}
