// decl_table/tests.rs

use super::*;
use crate::errors::SemanticError;
use crate::test_utils::{build, codes, table_from};

#[test]
fn registers_every_declaration_kind() {
    let table = table_from(
        "pub struct Point { x: f64, y: f64 }\n\
         trait Show { fn show(&self): str }\n\
         type Bytes: []u8\n\
         fn main() {}\n",
    );
    assert!(matches!(table.lookup("Point"), Some(DeclRef::Struct(_))));
    assert!(matches!(table.lookup("Show"), Some(DeclRef::Trait(_))));
    assert!(matches!(table.lookup("Bytes"), Some(DeclRef::Alias(_))));
    assert_eq!(table.lookup("main"), None);
    assert_eq!(table.functions().len(), 1);
    assert!(table.lookup_struct("Point").unwrap().public);
}

#[test]
fn duplicate_declaration_keeps_the_first() {
    let (table, errors) = build(&["struct A { x: int }", "trait A { fn f(&self) }"]);
    assert_eq!(codes(&errors), vec!["E2007"]);
    assert_eq!(errors[0].file, FileId::new(1));
    assert!(table.lookup_struct("A").is_some());
    assert!(table.lookup_trait("A").is_none());
}

#[test]
fn primitive_names_are_reserved() {
    let (table, errors) = build(&["struct int { x: u8 }\ntype str: int"]);
    assert_eq!(codes(&errors), vec!["E2008", "E2008"]);
    assert!(table.structs().is_empty());
    assert!(table.aliases().is_empty());
}

#[test]
fn duplicate_field_is_dropped() {
    let (table, errors) = build(&["struct P { x: int, y: int, x: str }"]);
    assert_eq!(codes(&errors), vec!["E2009"]);
    let p = table.lookup_struct("P").unwrap();
    let idents: Vec<&str> = p.fields.iter().map(|f| f.ident.as_str()).collect();
    assert_eq!(idents, vec!["x", "y"]);
    assert_eq!(p.find_field("x").unwrap().symbol.to_string(), "int");
}

#[test]
fn duplicate_type_param_is_dropped() {
    let (table, errors) = build(&["struct P[T, T] { x: T }"]);
    assert_eq!(codes(&errors), vec!["E2010"]);
    assert_eq!(table.lookup_struct("P").unwrap().generics.len(), 1);
}

#[test]
fn impl_methods_attach_in_file_then_source_order() {
    let (table, errors) = build(&[
        "struct S { x: int }\nimpl S { fn a(&self) {} fn b(&self) {} }",
        "impl S { fn a(self, n: int) {} }",
    ]);
    assert!(errors.is_empty(), "{errors:?}");
    let s = table.lookup_struct("S").unwrap();
    let methods: Vec<(&str, u32)> = s.methods.iter().map(|m| (m.ident.as_str(), m.file.index())).collect();
    assert_eq!(methods, vec![("a", 0), ("b", 0), ("a", 1)]);
    // First match wins; no overload resolution
    assert!(s.find_method("a").unwrap().signature.params.is_empty());
}

#[test]
fn trait_impl_is_recorded() {
    let table = table_from(
        "struct S { x: int }\n\
         trait Show { fn show(&self): str }\n\
         impl Show for S { fn show(&self): str {} }\n",
    );
    let s = table.lookup_struct("S").unwrap();
    assert!(s.implements("Show"));
    assert_eq!(s.implements.len(), 1);
    assert_eq!(s.methods.len(), 1);
}

#[test]
fn impl_errors() {
    let (table, errors) = build(&[
        "struct S { x: int }\n\
         trait T { fn f(&self) }\n\
         impl Missing { fn a(&self) {} }\n\
         impl Nope for S { fn b(&self) {} }\n\
         impl T for S { fn f(&self) {} }\n\
         impl T for S { fn f(&self) {} }\n",
    ]);
    assert_eq!(codes(&errors), vec!["E2011", "E2012", "E2013"]);
    let s = table.lookup_struct("S").unwrap();
    // The unknown trait's methods are kept, the duplicate block is skipped
    let idents: Vec<&str> = s.methods.iter().map(|m| m.ident.as_str()).collect();
    assert_eq!(idents, vec!["b", "f"]);
    assert_eq!(s.implements.len(), 1);
}

#[test]
fn impl_target_must_be_a_struct() {
    let (_, errors) = build(&["type A: int\nimpl A { fn f(&self) {} }"]);
    assert!(matches!(
        &errors[0].error,
        SemanticError::UnknownImplTarget { name, .. } if name == "A"
    ));
}

#[test]
fn alias_cycle_is_reported_once() {
    let (table, errors) = build(&["type A: B\ntype B: *A\ntype C: A\n"]);
    assert_eq!(codes(&errors), vec!["E2006"]);
    match &errors[0].error {
        SemanticError::AliasCycle { name, path, .. } => {
            assert_eq!(name, "A");
            assert_eq!(path, "A -> B -> A");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(table.lookup_alias("A").unwrap().cyclic);
    assert!(table.lookup_alias("B").unwrap().cyclic);
    assert!(!table.lookup_alias("C").unwrap().cyclic);
}

#[test]
fn self_referencing_alias_is_a_cycle() {
    let (_, errors) = build(&["type L: []L"]);
    match &errors[0].error {
        SemanticError::AliasCycle { path, .. } => assert_eq!(path, "L -> L"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn native_struct_keeps_directives_and_docs() {
    let table = table_from("/// A native handle\n#header \"handle.h\"\ncpp struct Handle[T] { raw: *T }");
    let h = table.lookup_struct("Handle").unwrap();
    assert!(h.native);
    assert_eq!(h.doc, "A native handle");
    assert_eq!(h.directives.len(), 1);
    assert_eq!(h.directives[0].tag, "header");
}
