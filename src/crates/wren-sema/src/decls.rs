// decls.rs
//
// Declaration model: structs, fields, methods, traits and aliases as they are
// written in source. Built once from the parsed files and immutable afterward.

use std::fmt;
use std::sync::Arc;

use wren_frontend::ast::{TypeExpr, TypeExprKind};
use wren_identity::{AliasId, FieldId, FileId, FnId, Span, StructId, TraitId};

pub use wren_frontend::ast::{Directive, Receiver};

/// Builds the canonical key of a struct identity: `Ident` or `Ident[A,B]`.
///
/// Arguments are joined with commas, without spaces, in declaration order.
pub fn canonical_name<S: AsRef<str>>(ident: &str, generic_args: &[S]) -> String {
    if generic_args.is_empty() {
        return ident.to_string();
    }
    let mut name = String::with_capacity(ident.len() + 2 + generic_args.len() * 8);
    name.push_str(ident);
    name.push('[');
    for (i, arg) in generic_args.iter().enumerate() {
        if i > 0 {
            name.push(',');
        }
        name.push_str(arg.as_ref());
    }
    name.push(']');
    name
}

/// A type reference as written in source, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    pub kind: TypeSymbolKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSymbolKind {
    Named { ident: String, args: Vec<TypeSymbol> },
    Pointer(Box<TypeSymbol>),
    Reference(Box<TypeSymbol>),
    Slice(Box<TypeSymbol>),
    SelfType,
}

impl TypeSymbol {
    pub fn named(ident: impl Into<String>, span: Span) -> Self {
        Self {
            kind: TypeSymbolKind::Named {
                ident: ident.into(),
                args: Vec::new(),
            },
            span,
        }
    }

    /// Structural equality that ignores spans and treats the implementing
    /// struct, written as `Self` or as its own name with its own generic
    /// parameters, as the same type.
    pub fn same_shape(&self, other: &TypeSymbol, self_ident: &str, generics: &[GenericParam]) -> bool {
        let names_self = |sym: &TypeSymbol| match &sym.kind {
            TypeSymbolKind::SelfType => true,
            TypeSymbolKind::Named { ident, args } => {
                ident == self_ident
                    && args.len() == generics.len()
                    && args.iter().zip(generics).all(|(arg, param)| {
                        matches!(&arg.kind, TypeSymbolKind::Named { ident, args } if args.is_empty() && *ident == param.ident)
                    })
            }
            _ => false,
        };
        if names_self(self) || names_self(other) {
            return names_self(self) && names_self(other);
        }
        match (&self.kind, &other.kind) {
            (
                TypeSymbolKind::Named { ident: a, args: a_args },
                TypeSymbolKind::Named { ident: b, args: b_args },
            ) => {
                a == b
                    && a_args.len() == b_args.len()
                    && a_args
                        .iter()
                        .zip(b_args)
                        .all(|(x, y)| x.same_shape(y, self_ident, generics))
            }
            (TypeSymbolKind::Pointer(a), TypeSymbolKind::Pointer(b))
            | (TypeSymbolKind::Reference(a), TypeSymbolKind::Reference(b))
            | (TypeSymbolKind::Slice(a), TypeSymbolKind::Slice(b)) => a.same_shape(b, self_ident, generics),
            _ => false,
        }
    }
}

impl From<&TypeExpr> for TypeSymbol {
    fn from(expr: &TypeExpr) -> Self {
        let kind = match &expr.kind {
            TypeExprKind::Named { name, args } => TypeSymbolKind::Named {
                ident: name.name.clone(),
                args: args.iter().map(TypeSymbol::from).collect(),
            },
            TypeExprKind::Pointer(inner) => TypeSymbolKind::Pointer(Box::new(inner.as_ref().into())),
            TypeExprKind::Reference(inner) => TypeSymbolKind::Reference(Box::new(inner.as_ref().into())),
            TypeExprKind::Slice(inner) => TypeSymbolKind::Slice(Box::new(inner.as_ref().into())),
            TypeExprKind::SelfType => TypeSymbolKind::SelfType,
        };
        Self {
            kind,
            span: expr.span,
        }
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeSymbolKind::Named { ident, args } => {
                if args.is_empty() {
                    f.write_str(ident)
                } else {
                    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                    f.write_str(&canonical_name(ident, &args))
                }
            }
            TypeSymbolKind::Pointer(inner) => write!(f, "*{inner}"),
            TypeSymbolKind::Reference(inner) => write!(f, "&{inner}"),
            TypeSymbolKind::Slice(inner) => write!(f, "[]{inner}"),
            TypeSymbolKind::SelfType => f.write_str("Self"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParam {
    pub ident: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub id: FieldId,
    pub ident: String,
    pub symbol: TypeSymbol,
    /// Interior mutability: writable through a read-only struct reference
    pub mutable: bool,
    pub public: bool,
    pub doc: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ident: String,
    pub symbol: TypeSymbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeSymbol>,
}

impl Signature {
    /// Same receiver, arity, parameter types and return type. Parameter
    /// names are not part of the shape.
    pub fn shape_matches(&self, required: &Signature, self_ident: &str, generics: &[GenericParam]) -> bool {
        self.receiver == required.receiver
            && self.params.len() == required.params.len()
            && self
                .params
                .iter()
                .zip(&required.params)
                .all(|(p, r)| p.symbol.same_shape(&r.symbol, self_ident, generics))
            && match (&self.return_type, &required.return_type) {
                (None, None) => true,
                (Some(a), Some(b)) => a.same_shape(b, self_ident, generics),
                _ => false,
            }
    }

    /// Renders `fn name(&self, x: int): str`.
    pub fn display(&self, ident: &str) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.params.len() + 1);
        if let Some(receiver) = self.receiver {
            parts.push(receiver.as_str().to_string());
        }
        parts.extend(self.params.iter().map(|p| format!("{}: {}", p.ident, p.symbol)));
        let mut out = format!("fn {}({})", ident, parts.join(", "));
        if let Some(ret) = &self.return_type {
            out.push_str(": ");
            out.push_str(&ret.to_string());
        }
        out
    }
}

/// A method (or free function). `body` is the span of the unparsed body.
#[derive(Debug, Clone)]
pub struct Fn {
    pub id: FnId,
    pub ident: String,
    pub signature: Signature,
    pub body: Option<Span>,
    pub public: bool,
    pub doc: String,
    /// File the method was written in; impl blocks may live apart from their struct
    pub file: FileId,
    pub span: Span,
}

/// A method a trait requires
#[derive(Debug, Clone)]
pub struct TraitMethod {
    pub ident: String,
    pub signature: Signature,
    pub doc: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Trait {
    pub id: TraitId,
    pub ident: String,
    pub methods: Vec<TraitMethod>,
    pub public: bool,
    pub doc: String,
    pub file: FileId,
    pub span: Span,
}

impl Trait {
    pub fn find_method(&self, ident: &str) -> Option<&TraitMethod> {
        self.methods.iter().find(|m| m.ident == ident)
    }
}

/// A trait conformance declared by an `impl Trait for S` block
#[derive(Debug, Clone)]
pub struct TraitImpl {
    pub trait_decl: Arc<Trait>,
    pub file: FileId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Struct {
    pub id: StructId,
    pub ident: String,
    pub generics: Vec<GenericParam>,
    pub fields: Vec<Field>,
    pub methods: Vec<Fn>,
    pub public: bool,
    /// Maps onto an existing native type; never expanded per argument list
    pub native: bool,
    pub directives: Vec<Directive>,
    pub doc: String,
    pub implements: Vec<TraitImpl>,
    pub file: FileId,
    pub span: Span,
}

impl Struct {
    /// First method named `ident`, in declaration order.
    pub fn find_method(&self, ident: &str) -> Option<&Fn> {
        self.methods.iter().find(|m| m.ident == ident)
    }

    pub fn find_field(&self, ident: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.ident == ident)
    }

    pub fn generic_index(&self, ident: &str) -> Option<usize> {
        self.generics.iter().position(|g| g.ident == ident)
    }

    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    pub fn canonical_name<S: AsRef<str>>(&self, generic_args: &[S]) -> String {
        canonical_name(&self.ident, generic_args)
    }

    pub fn implements(&self, trait_ident: &str) -> bool {
        self.implements
            .iter()
            .any(|imp| imp.trait_decl.ident == trait_ident)
    }
}

/// `type Name: Target`
#[derive(Debug, Clone)]
pub struct Alias {
    pub id: AliasId,
    pub ident: String,
    pub target: TypeSymbol,
    pub public: bool,
    pub doc: String,
    /// Set when the alias takes part in a cycle of aliases
    pub cyclic: bool,
    pub file: FileId,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(id: u32, ident: &str) -> Fn {
        Fn {
            id: FnId::new(id),
            ident: ident.to_string(),
            signature: Signature {
                receiver: Some(Receiver::Ref),
                params: Vec::new(),
                return_type: None,
            },
            body: Some(Span::default()),
            public: false,
            doc: String::new(),
            file: FileId::new(0),
            span: Span::default(),
        }
    }

    fn empty_struct(ident: &str, methods: Vec<Fn>) -> Struct {
        Struct {
            id: StructId::new(0),
            ident: ident.to_string(),
            generics: Vec::new(),
            fields: Vec::new(),
            methods,
            public: false,
            native: false,
            directives: Vec::new(),
            doc: String::new(),
            implements: Vec::new(),
            file: FileId::new(0),
            span: Span::default(),
        }
    }

    #[test]
    fn canonical_name_format() {
        assert_eq!(canonical_name("Pair", &["Int", "Str"]), "Pair[Int,Str]");
        assert_eq!(canonical_name::<&str>("Point", &[]), "Point");
        assert_eq!(
            canonical_name("Pair", &["Box[int]", "str"]),
            "Pair[Box[int],str]"
        );
    }

    #[test]
    fn find_method_returns_first_match() {
        let s = empty_struct("S", vec![method(0, "a"), method(1, "b"), method(2, "a")]);
        assert_eq!(s.find_method("a").map(|m| m.id), Some(FnId::new(0)));
        assert_eq!(s.find_method("b").map(|m| m.id), Some(FnId::new(1)));
        assert!(s.find_method("c").is_none());
    }

    #[test]
    fn self_shape_matches_own_name_with_own_params() {
        let span = Span::default();
        let generics = vec![
            GenericParam { ident: "T".into(), span },
            GenericParam { ident: "U".into(), span },
        ];
        let self_sym = TypeSymbol {
            kind: TypeSymbolKind::SelfType,
            span,
        };
        let own = TypeSymbol {
            kind: TypeSymbolKind::Named {
                ident: "Pair".into(),
                args: vec![TypeSymbol::named("T", span), TypeSymbol::named("U", span)],
            },
            span,
        };
        let swapped = TypeSymbol {
            kind: TypeSymbolKind::Named {
                ident: "Pair".into(),
                args: vec![TypeSymbol::named("U", span), TypeSymbol::named("T", span)],
            },
            span,
        };
        assert!(self_sym.same_shape(&own, "Pair", &generics));
        assert!(own.same_shape(&self_sym, "Pair", &generics));
        assert!(!self_sym.same_shape(&swapped, "Pair", &generics));

        let ptr_self = TypeSymbol {
            kind: TypeSymbolKind::Pointer(Box::new(self_sym.clone())),
            span,
        };
        let ptr_own = TypeSymbol {
            kind: TypeSymbolKind::Pointer(Box::new(own)),
            span,
        };
        assert!(ptr_self.same_shape(&ptr_own, "Pair", &generics));
    }

    #[test]
    fn signature_display() {
        let span = Span::default();
        let sig = Signature {
            receiver: Some(Receiver::Ref),
            params: vec![Param {
                ident: "pad".into(),
                symbol: TypeSymbol::named("int", span),
                span,
            }],
            return_type: Some(TypeSymbol::named("str", span)),
        };
        assert_eq!(sig.display("show"), "fn show(&self, pad: int): str");
    }
}
