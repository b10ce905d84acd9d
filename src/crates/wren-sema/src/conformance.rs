// conformance.rs
//
// Trait conformance: every method a trait requires must be present on the
// implementing struct with the same shape.

use wren_identity::{FileId, Span};

use crate::decl_table::DeclTable;
use crate::decls::{GenericParam, Param, Signature, Struct, TypeSymbol, TypeSymbolKind};
use crate::errors::{SemanticError, TypeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConformanceError {
    MissingMethod {
        struct_name: String,
        trait_name: String,
        method: String,
        file: FileId,
        /// The `impl` block that declared the conformance
        span: Span,
    },
    SignatureMismatch {
        struct_name: String,
        trait_name: String,
        method: String,
        expected: String,
        found: String,
        file: FileId,
        /// The offending method
        span: Span,
    },
}

impl ConformanceError {
    pub fn method(&self) -> &str {
        match self {
            ConformanceError::MissingMethod { method, .. } | ConformanceError::SignatureMismatch { method, .. } => {
                method
            }
        }
    }

    pub fn into_type_error(self) -> TypeError {
        match self {
            ConformanceError::MissingMethod {
                struct_name,
                trait_name,
                method,
                file,
                span,
            } => TypeError::new(
                SemanticError::TraitNotSatisfied {
                    type_name: struct_name,
                    trait_name,
                    method,
                    span: span.into(),
                },
                span,
                file,
            ),
            ConformanceError::SignatureMismatch {
                trait_name,
                method,
                expected,
                found,
                file,
                span,
                ..
            } => TypeError::new(
                SemanticError::TraitSignatureMismatch {
                    trait_name,
                    method,
                    expected,
                    found,
                    span: span.into(),
                },
                span,
                file,
            ),
        }
    }
}

/// Check every trait `decl` implements. Pure: reads the declarations only.
/// Aliases are expanded before signatures are compared.
pub fn check_conformance(decl: &Struct, table: &DeclTable) -> Vec<ConformanceError> {
    let mut errors = Vec::new();
    for imp in &decl.implements {
        let trait_decl = &imp.trait_decl;
        for required in &trait_decl.methods {
            match decl.find_method(&required.ident) {
                None => errors.push(ConformanceError::MissingMethod {
                    struct_name: decl.ident.clone(),
                    trait_name: trait_decl.ident.clone(),
                    method: required.ident.clone(),
                    file: imp.file,
                    span: imp.span,
                }),
                Some(found) if !shapes_match(decl, &found.signature, &required.signature, table) => {
                    errors.push(ConformanceError::SignatureMismatch {
                        struct_name: decl.ident.clone(),
                        trait_name: trait_decl.ident.clone(),
                        method: required.ident.clone(),
                        expected: required.signature.display(&required.ident),
                        found: found.signature.display(&found.ident),
                        file: found.file,
                        span: found.span,
                    })
                }
                Some(_) => {}
            }
        }
    }
    errors
}

fn shapes_match(decl: &Struct, found: &Signature, required: &Signature, table: &DeclTable) -> bool {
    let found = expand_signature(found, table, &decl.generics);
    let required = expand_signature(required, table, &[]);
    found.shape_matches(&required, &decl.ident, &decl.generics)
}

fn expand_signature(signature: &Signature, table: &DeclTable, generics: &[GenericParam]) -> Signature {
    Signature {
        receiver: signature.receiver,
        params: signature
            .params
            .iter()
            .map(|p| Param {
                ident: p.ident.clone(),
                symbol: expand_aliases(&p.symbol, table, generics),
                span: p.span,
            })
            .collect(),
        return_type: signature.return_type.as_ref().map(|r| expand_aliases(r, table, generics)),
    }
}

/// Replace every alias name with its target. Generic parameters shadow
/// aliases; cyclic aliases are left as written.
fn expand_aliases(symbol: &TypeSymbol, table: &DeclTable, generics: &[GenericParam]) -> TypeSymbol {
    let kind = match &symbol.kind {
        TypeSymbolKind::Named { ident, args } => {
            let shadowed = generics.iter().any(|g| g.ident == *ident);
            match table.lookup_alias(ident) {
                Some(alias) if !shadowed && args.is_empty() && !alias.cyclic => {
                    return expand_aliases(&alias.target, table, &[]);
                }
                _ => TypeSymbolKind::Named {
                    ident: ident.clone(),
                    args: args.iter().map(|a| expand_aliases(a, table, generics)).collect(),
                },
            }
        }
        TypeSymbolKind::Pointer(inner) => TypeSymbolKind::Pointer(Box::new(expand_aliases(inner, table, generics))),
        TypeSymbolKind::Reference(inner) => TypeSymbolKind::Reference(Box::new(expand_aliases(inner, table, generics))),
        TypeSymbolKind::Slice(inner) => TypeSymbolKind::Slice(Box::new(expand_aliases(inner, table, generics))),
        TypeSymbolKind::SelfType => TypeSymbolKind::SelfType,
    };
    TypeSymbol {
        kind,
        span: symbol.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::table_from;

    #[test]
    fn complete_impl_conforms() {
        let table = table_from(
            "struct S { x: int }\n\
             trait Show { fn show(&self): str\n fn width(&self, pad: int): uint }\n\
             impl Show for S {\n fn show(&self): str {}\n fn width(&self, n: int): uint {}\n}\n",
        );
        assert!(check_conformance(table.lookup_struct("S").unwrap(), &table).is_empty());
    }

    #[test]
    fn missing_method_is_reported() {
        let table = table_from(
            "struct S { x: int }\n\
             trait FooBar { fn foo(&self)\n fn bar(&self) }\n\
             impl FooBar for S { fn foo(&self) {} }\n",
        );
        let errors = check_conformance(table.lookup_struct("S").unwrap(), &table);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].method(), "bar");
        assert!(matches!(&errors[0], ConformanceError::MissingMethod { trait_name, .. } if trait_name == "FooBar"));
    }

    #[test]
    fn methods_from_plain_impls_count() {
        let table = table_from(
            "struct S { x: int }\n\
             trait Foo { fn foo(&self) }\n\
             impl Foo for S {}\n\
             impl S { fn foo(&self) {} }\n",
        );
        assert!(check_conformance(table.lookup_struct("S").unwrap(), &table).is_empty());
    }

    #[test]
    fn receiver_and_types_must_match() {
        let table = table_from(
            "struct S { x: int }\n\
             trait T { fn a(&self)\n fn b(&self, x: int)\n fn c(&self): int }\n\
             impl T for S {\n fn a(mut self) {}\n fn b(&self, x: str) {}\n fn c(&self) {}\n}\n",
        );
        let errors = check_conformance(table.lookup_struct("S").unwrap(), &table);
        let methods: Vec<&str> = errors.iter().map(ConformanceError::method).collect();
        assert_eq!(methods, vec!["a", "b", "c"]);
        match &errors[1] {
            ConformanceError::SignatureMismatch { expected, found, .. } => {
                assert_eq!(expected, "fn b(&self, x: int)");
                assert_eq!(found, "fn b(&self, x: str)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn self_matches_the_implementing_struct() {
        let table = table_from(
            "struct Pair[T] { a: T, b: T }\n\
             trait Same { fn same(&self, other: &Self): bool }\n\
             impl Same for Pair { fn same(&self, other: &Pair[T]): bool {} }\n",
        );
        assert!(check_conformance(table.lookup_struct("Pair").unwrap(), &table).is_empty());
    }

    #[test]
    fn first_method_is_the_one_checked() {
        let table = table_from(
            "struct S { x: int }\n\
             trait T { fn a(&self) }\n\
             impl T for S { fn a(&self, n: int) {} }\n\
             impl S { fn a(&self) {} }\n",
        );
        let errors = check_conformance(table.lookup_struct("S").unwrap(), &table);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].clone().into_type_error().error.to_string(), "method 'a' has wrong signature for trait 'T'");
    }

    #[test]
    fn aliases_match_their_targets() {
        let table = table_from(
            "type Num: int\n\
             type Nums: []Num\n\
             struct S { x: int }\n\
             trait T { fn f(&self, n: int): []int\n fn g(&self, n: *Num) }\n\
             impl T for S {\n fn f(&self, n: Num): Nums {}\n fn g(&self, n: *int) {}\n}\n",
        );
        assert!(check_conformance(table.lookup_struct("S").unwrap(), &table).is_empty());
    }

    #[test]
    fn aliases_to_other_types_still_mismatch() {
        let table = table_from(
            "type Num: int\n\
             struct S { x: int }\n\
             trait T { fn f(&self, n: str) }\n\
             impl T for S { fn f(&self, n: Num) {} }\n",
        );
        let errors = check_conformance(table.lookup_struct("S").unwrap(), &table);
        assert_eq!(errors.len(), 1);
        // Diagnostics show the signatures as written
        assert!(matches!(&errors[0], ConformanceError::SignatureMismatch { found, .. } if found == "fn f(&self, n: Num)"));
    }
}
