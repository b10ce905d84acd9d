// resolve.rs
//
// TypeSymbol -> TypeKind resolution. Generic parameters come from the
// substitution context; other names are looked up in the declaration table
// and then among the builtin primitives.

use rustc_hash::FxHashMap;
use wren_identity::{FileId, PrimitiveType, Span};

use crate::decl_table::{DeclRef, DeclTable};
use crate::decls::{GenericParam, TypeSymbol, TypeSymbolKind};
use crate::diagnostics::Diagnostics;
use crate::errors::SemanticError;
use crate::generic::{InstanceCache, InstantiateError};
use crate::type_kind::{TypeKind, TypeKindVec};

/// Bindings in effect where a symbol is written: the file it lives in, the
/// substituted generic parameters and what `Self` stands for.
#[derive(Debug, Clone)]
pub struct SubstitutionContext {
    pub file: FileId,
    params: FxHashMap<String, TypeKind>,
    self_type: Option<TypeKind>,
    /// Instances under construction that led here
    depth: u32,
}

impl SubstitutionContext {
    /// A context with no generic parameters in scope
    pub fn empty(file: FileId) -> Self {
        Self {
            file,
            params: FxHashMap::default(),
            self_type: None,
            depth: 0,
        }
    }

    pub(crate) fn at_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn bind(&mut self, param: impl Into<String>, kind: TypeKind) {
        self.params.insert(param.into(), kind);
    }

    pub fn with_self(mut self, kind: TypeKind) -> Self {
        self.self_type = Some(kind);
        self
    }

    pub fn param(&self, ident: &str) -> Option<&TypeKind> {
        self.params.get(ident)
    }
}

/// The names visible inside a generic declaration, for checking symbols
/// without instantiating anything.
#[derive(Debug, Clone, Copy)]
pub struct GenericScope<'a> {
    pub file: FileId,
    pub params: &'a [GenericParam],
    /// Inside trait and impl signatures
    pub allows_self: bool,
}

impl<'a> GenericScope<'a> {
    pub fn new(file: FileId, params: &'a [GenericParam]) -> Self {
        Self {
            file,
            params,
            allows_self: false,
        }
    }

    pub fn allowing_self(mut self) -> Self {
        self.allows_self = true;
        self
    }

    fn has_param(&self, ident: &str) -> bool {
        self.params.iter().any(|p| p.ident == ident)
    }
}

pub struct Resolver<'a> {
    table: &'a DeclTable,
    cache: &'a InstanceCache,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a DeclTable, cache: &'a InstanceCache) -> Self {
        Self { table, cache }
    }

    pub fn table(&self) -> &'a DeclTable {
        self.table
    }

    pub fn cache(&self) -> &'a InstanceCache {
        self.cache
    }

    /// Resolve `symbol` to a closed type. Errors are reported to `diags` and
    /// the failing reference becomes `TypeKind::Invalid`.
    pub fn resolve(&self, symbol: &TypeSymbol, ctx: &SubstitutionContext, diags: &mut Diagnostics) -> TypeKind {
        match &symbol.kind {
            TypeSymbolKind::Named { ident, args } => self.resolve_named(ident, args, symbol.span, ctx, diags),
            TypeSymbolKind::Pointer(inner) => wrap(self.resolve(inner, ctx, diags), TypeKind::Ptr),
            TypeSymbolKind::Reference(inner) => wrap(self.resolve(inner, ctx, diags), TypeKind::Ref),
            TypeSymbolKind::Slice(inner) => wrap(self.resolve(inner, ctx, diags), TypeKind::Slice),
            TypeSymbolKind::SelfType => match &ctx.self_type {
                Some(kind) => kind.clone(),
                None => {
                    diags.error(
                        ctx.file,
                        SemanticError::SelfOutsideImpl {
                            span: symbol.span.into(),
                        },
                        symbol.span,
                    );
                    TypeKind::Invalid
                }
            },
        }
    }

    fn resolve_named(
        &self,
        ident: &str,
        args: &[TypeSymbol],
        span: Span,
        ctx: &SubstitutionContext,
        diags: &mut Diagnostics,
    ) -> TypeKind {
        if let Some(kind) = ctx.param(ident) {
            if !args.is_empty() {
                diags.error(
                    ctx.file,
                    SemanticError::TypeParamWithArgs {
                        name: ident.to_string(),
                        span: span.into(),
                    },
                    span,
                );
                return TypeKind::Invalid;
            }
            return kind.clone();
        }

        match self.table.lookup(ident) {
            Some(DeclRef::Struct(id)) => {
                let decl = self.table.get_struct(id);
                let mut resolved = TypeKindVec::with_capacity(args.len());
                for arg in args {
                    resolved.push(self.resolve(arg, ctx, diags));
                }
                if resolved.iter().any(TypeKind::is_invalid) {
                    return TypeKind::Invalid;
                }
                let use_args = if decl.native { resolved.clone() } else { TypeKindVec::new() };
                match self.cache.instantiate_at(decl, resolved, self, ctx.depth, diags) {
                    Ok(ins) => TypeKind::instance(ins, use_args),
                    Err(InstantiateError::WrongTypeArgCount { expected, found }) => {
                        diags.error(
                            ctx.file,
                            SemanticError::WrongTypeArgCount {
                                name: ident.to_string(),
                                expected,
                                found,
                                span: span.into(),
                            },
                            span,
                        );
                        TypeKind::Invalid
                    }
                    Err(InstantiateError::TooDeep { limit }) => {
                        diags.error(
                            ctx.file,
                            SemanticError::InstantiationTooDeep {
                                name: ident.to_string(),
                                limit,
                                span: span.into(),
                            },
                            span,
                        );
                        TypeKind::Invalid
                    }
                }
            }
            Some(DeclRef::Alias(id)) => {
                let alias = self.table.get_alias(id);
                if !args.is_empty() {
                    self.unexpected_args(ident, span, ctx.file, diags);
                    return TypeKind::Invalid;
                }
                if alias.cyclic {
                    return TypeKind::Invalid;
                }
                // Alias targets see no generic parameters of the use site
                let alias_ctx = SubstitutionContext::empty(alias.file).at_depth(ctx.depth);
                self.resolve(&alias.target, &alias_ctx, diags)
            }
            Some(DeclRef::Trait(_)) => {
                diags.error(
                    ctx.file,
                    SemanticError::TraitAsType {
                        name: ident.to_string(),
                        span: span.into(),
                    },
                    span,
                );
                TypeKind::Invalid
            }
            None => match PrimitiveType::from_name(ident) {
                Some(prim) if args.is_empty() => TypeKind::Prim(prim),
                Some(_) => {
                    self.unexpected_args(ident, span, ctx.file, diags);
                    TypeKind::Invalid
                }
                None => {
                    diags.error(
                        ctx.file,
                        SemanticError::UnknownType {
                            name: ident.to_string(),
                            span: span.into(),
                        },
                        span,
                    );
                    TypeKind::Invalid
                }
            },
        }
    }

    /// Validate `symbol` inside a (possibly generic) declaration without
    /// instantiating anything. Reports the same errors `resolve` would for
    /// names and arity, so never-instantiated generics are still checked.
    pub fn check(&self, symbol: &TypeSymbol, scope: GenericScope<'_>, diags: &mut Diagnostics) {
        let span = symbol.span;
        match &symbol.kind {
            TypeSymbolKind::Pointer(inner) | TypeSymbolKind::Reference(inner) | TypeSymbolKind::Slice(inner) => {
                self.check(inner, scope, diags)
            }
            TypeSymbolKind::SelfType => {
                if !scope.allows_self {
                    diags.error(scope.file, SemanticError::SelfOutsideImpl { span: span.into() }, span);
                }
            }
            TypeSymbolKind::Named { ident, args } => {
                if scope.has_param(ident) {
                    if !args.is_empty() {
                        diags.error(
                            scope.file,
                            SemanticError::TypeParamWithArgs {
                                name: ident.clone(),
                                span: span.into(),
                            },
                            span,
                        );
                    }
                    return;
                }

                match self.table.lookup(ident) {
                    Some(DeclRef::Struct(id)) => {
                        for arg in args {
                            self.check(arg, scope, diags);
                        }
                        let expected = self.table.get_struct(id).generics.len();
                        if args.len() != expected {
                            diags.error(
                                scope.file,
                                SemanticError::WrongTypeArgCount {
                                    name: ident.clone(),
                                    expected,
                                    found: args.len(),
                                    span: span.into(),
                                },
                                span,
                            );
                        }
                    }
                    Some(DeclRef::Alias(_)) => {
                        if !args.is_empty() {
                            self.unexpected_args(ident, span, scope.file, diags);
                        }
                    }
                    Some(DeclRef::Trait(_)) => diags.error(
                        scope.file,
                        SemanticError::TraitAsType {
                            name: ident.clone(),
                            span: span.into(),
                        },
                        span,
                    ),
                    None => match PrimitiveType::from_name(ident) {
                        Some(_) if args.is_empty() => {}
                        Some(_) => self.unexpected_args(ident, span, scope.file, diags),
                        None => diags.error(
                            scope.file,
                            SemanticError::UnknownType {
                                name: ident.clone(),
                                span: span.into(),
                            },
                            span,
                        ),
                    },
                }
            }
        }
    }

    fn unexpected_args(&self, ident: &str, span: Span, file: FileId, diags: &mut Diagnostics) {
        diags.error(
            file,
            SemanticError::UnexpectedTypeArgs {
                name: ident.to_string(),
                span: span.into(),
            },
            span,
        );
    }
}

/// Wrap a resolved inner type, keeping `Invalid` unwrapped
fn wrap(inner: TypeKind, make: fn(Box<TypeKind>) -> TypeKind) -> TypeKind {
    if inner.is_invalid() {
        inner
    } else {
        make(Box::new(inner))
    }
}
