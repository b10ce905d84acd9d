// src/ast.rs
//
// Declaration-level AST. Function bodies are not parsed; they are kept as the
// span of their braces.

use std::fmt;

pub use crate::token::Span;

/// A parsed source file
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub declarations: Vec<Decl>,
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    Struct(StructDecl),
    Trait(TraitDecl),
    Impl(ImplBlock),
    Alias(AliasDecl),
    Function(FuncDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Struct(d) => d.span,
            Decl::Trait(d) => d.span,
            Decl::Impl(d) => d.span,
            Decl::Alias(d) => d.span,
            Decl::Function(d) => d.span,
        }
    }
}

/// An identifier with its source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `#tag args…` line preceding a struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub tag: String,
    pub args: Vec<String>,
    pub span: Span,
}

/// Generic parameter in `struct Name[T, U]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub span: Span,
}

/// `[pub] [cpp] struct Name[T…] { fields }`
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub fields: Vec<FieldDecl>,
    pub public: bool,
    /// Linked against an existing native type (`cpp struct`)
    pub native: bool,
    pub directives: Vec<Directive>,
    pub doc: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub public: bool,
    pub mutable: bool,
    pub doc: String,
    pub span: Span,
}

/// `[pub] trait Name { fn … }`
#[derive(Debug, Clone)]
pub struct TraitDecl {
    pub name: Ident,
    pub public: bool,
    pub methods: Vec<FuncDecl>,
    pub doc: String,
    pub span: Span,
}

/// `impl Trait for Target { … }` or `impl Target { … }`
#[derive(Debug, Clone)]
pub struct ImplBlock {
    pub trait_name: Option<Ident>,
    pub target: Ident,
    pub methods: Vec<FuncDecl>,
    pub span: Span,
}

/// `[pub] type Name: Type`
#[derive(Debug, Clone)]
pub struct AliasDecl {
    pub name: Ident,
    pub target: TypeExpr,
    pub public: bool,
    pub doc: String,
    pub span: Span,
}

/// How a method receives its instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// `self`
    Value,
    /// `mut self`
    MutValue,
    /// `&self`
    Ref,
}

impl Receiver {
    pub fn as_str(self) -> &'static str {
        match self {
            Receiver::Value => "self",
            Receiver::MutValue => "mut self",
            Receiver::Ref => "&self",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Function or method declaration. `body` is the span of the braces, or
/// `None` for required trait methods.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub public: bool,
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub body: Option<Span>,
    pub doc: String,
    pub span: Span,
}

/// Type expressions (as written in source)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Plain `Name` with no type arguments.
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self::new(
            TypeExprKind::Named {
                name: Ident::new(name, span),
                args: Vec::new(),
            },
            span,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExprKind {
    /// `Name` or `Name[A, B]`
    Named { name: Ident, args: Vec<TypeExpr> },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `&T`
    Reference(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `Self` inside trait and impl signatures
    SelfType,
}

/// Compact form without spaces, e.g. `Pair[*Box[int],[]u8]`.
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Named { name, args } => {
                f.write_str(&name.name)?;
                if !args.is_empty() {
                    f.write_str("[")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
            TypeExprKind::Pointer(inner) => write!(f, "*{inner}"),
            TypeExprKind::Reference(inner) => write!(f, "&{inner}"),
            TypeExprKind::Slice(inner) => write!(f, "[]{inner}"),
            TypeExprKind::SelfType => f.write_str("Self"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_expr_display_is_compact() {
        let span = Span::default();
        let inner = TypeExpr::new(
            TypeExprKind::Named {
                name: Ident::new("Box", span),
                args: vec![TypeExpr::named("int", span)],
            },
            span,
        );
        let ty = TypeExpr::new(
            TypeExprKind::Named {
                name: Ident::new("Pair", span),
                args: vec![
                    TypeExpr::new(TypeExprKind::Pointer(Box::new(inner)), span),
                    TypeExpr::new(
                        TypeExprKind::Slice(Box::new(TypeExpr::named("u8", span))),
                        span,
                    ),
                ],
            },
            span,
        );
        assert_eq!(ty.to_string(), "Pair[*Box[int],[]u8]");
    }
}
