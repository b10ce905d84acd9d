// decl_table/build.rs
//
// Builds the declaration table from every parsed file: registers names,
// attaches impl blocks to their structs and marks alias cycles.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use wren_frontend::ast::{
    AliasDecl, Decl, FieldDecl, FuncDecl, Ident, ImplBlock, StructDecl, TraitDecl, TypeParam,
};
use wren_identity::{AliasId, FieldId, FileId, FnId, PrimitiveType, StructId, TraitId};

use super::{DeclRef, DeclTable, FileUnit};
use crate::decls::{
    Alias, Field, Fn, GenericParam, Param, Signature, Struct, Trait, TraitImpl, TraitMethod,
    TypeSymbol, TypeSymbolKind,
};
use crate::diagnostics::Diagnostics;
use crate::errors::{SemanticError, TypeError};

#[derive(Default)]
struct Builder {
    structs: Vec<Struct>,
    traits: Vec<Arc<Trait>>,
    aliases: Vec<Alias>,
    functions: Vec<Fn>,
    names: FxHashMap<String, DeclRef>,
    diags: Diagnostics,
}

impl DeclTable {
    /// Build the table from all files of a compilation. Errors are returned
    /// alongside a table holding every declaration that could be registered.
    #[tracing::instrument(level = "debug", skip_all, fields(files = units.len()))]
    pub fn build(units: &[FileUnit]) -> (DeclTable, Vec<TypeError>) {
        let mut builder = Builder::default();

        for unit in units {
            for decl in &unit.program.declarations {
                match decl {
                    Decl::Struct(s) => builder.register_struct(unit.file, s),
                    Decl::Trait(t) => builder.register_trait(unit.file, t),
                    Decl::Alias(a) => builder.register_alias(unit.file, a),
                    Decl::Function(f) => {
                        let id = FnId::new(builder.functions.len() as u32);
                        builder.functions.push(lower_fn(id, unit.file, f));
                    }
                    Decl::Impl(_) => {}
                }
            }
        }

        // Impl blocks may name structs and traits from any file
        for unit in units {
            for decl in &unit.program.declarations {
                if let Decl::Impl(block) = decl {
                    builder.attach_impl(unit.file, block);
                }
            }
        }

        builder.mark_alias_cycles();

        let Builder {
            structs,
            traits,
            aliases,
            functions,
            names,
            diags,
        } = builder;

        tracing::debug!(
            structs = structs.len(),
            traits = traits.len(),
            aliases = aliases.len(),
            functions = functions.len(),
            errors = diags.len(),
            "declaration table built"
        );

        let table = DeclTable {
            structs: structs.into_iter().map(Arc::new).collect(),
            traits,
            aliases: aliases.into_iter().map(Arc::new).collect(),
            functions: functions.into_iter().map(Arc::new).collect(),
            names,
        };
        (table, diags.into_sorted())
    }
}

impl Builder {
    /// Claim a global type-level name, reporting reserved and duplicate names.
    fn claim_name(&mut self, file: FileId, name: &Ident, decl: DeclRef) -> bool {
        if PrimitiveType::from_name(&name.name).is_some() {
            self.diags.error(
                file,
                SemanticError::ReservedTypeName {
                    name: name.name.clone(),
                    span: name.span.into(),
                },
                name.span,
            );
            return false;
        }
        if self.names.contains_key(&name.name) {
            self.diags.error(
                file,
                SemanticError::DuplicateDeclaration {
                    name: name.name.clone(),
                    span: name.span.into(),
                },
                name.span,
            );
            return false;
        }
        self.names.insert(name.name.clone(), decl);
        true
    }

    fn register_struct(&mut self, file: FileId, decl: &StructDecl) {
        let id = StructId::new(self.structs.len() as u32);
        if !self.claim_name(file, &decl.name, DeclRef::Struct(id)) {
            return;
        }

        let generics = self.generic_params(file, &decl.type_params);

        let mut fields: Vec<Field> = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            if let Some(first) = fields.iter().find(|f| f.ident == field.name.name) {
                let first_span = first.span;
                self.diags.error(
                    file,
                    SemanticError::DuplicateField {
                        struct_name: decl.name.name.clone(),
                        field: field.name.name.clone(),
                        span: field.name.span.into(),
                        first: first_span.into(),
                    },
                    field.name.span,
                );
                continue;
            }
            fields.push(lower_field(FieldId::new(fields.len() as u32), field));
        }

        self.structs.push(Struct {
            id,
            ident: decl.name.name.clone(),
            generics,
            fields,
            methods: Vec::new(),
            public: decl.public,
            native: decl.native,
            directives: decl.directives.clone(),
            doc: decl.doc.clone(),
            implements: Vec::new(),
            file,
            span: decl.span,
        });
    }

    fn generic_params(&mut self, file: FileId, params: &[TypeParam]) -> Vec<GenericParam> {
        let mut generics: Vec<GenericParam> = Vec::with_capacity(params.len());
        for param in params {
            if generics.iter().any(|g| g.ident == param.name) {
                self.diags.error(
                    file,
                    SemanticError::DuplicateTypeParam {
                        name: param.name.clone(),
                        span: param.span.into(),
                    },
                    param.span,
                );
                continue;
            }
            generics.push(GenericParam {
                ident: param.name.clone(),
                span: param.span,
            });
        }
        generics
    }

    fn register_trait(&mut self, file: FileId, decl: &TraitDecl) {
        let id = TraitId::new(self.traits.len() as u32);
        if !self.claim_name(file, &decl.name, DeclRef::Trait(id)) {
            return;
        }
        let methods = decl
            .methods
            .iter()
            .map(|m| TraitMethod {
                ident: m.name.name.clone(),
                signature: lower_signature(m),
                doc: m.doc.clone(),
                span: m.span,
            })
            .collect();
        self.traits.push(Arc::new(Trait {
            id,
            ident: decl.name.name.clone(),
            methods,
            public: decl.public,
            doc: decl.doc.clone(),
            file,
            span: decl.span,
        }));
    }

    fn register_alias(&mut self, file: FileId, decl: &AliasDecl) {
        let id = AliasId::new(self.aliases.len() as u32);
        if !self.claim_name(file, &decl.name, DeclRef::Alias(id)) {
            return;
        }
        self.aliases.push(Alias {
            id,
            ident: decl.name.name.clone(),
            target: TypeSymbol::from(&decl.target),
            public: decl.public,
            doc: decl.doc.clone(),
            cyclic: false,
            file,
            span: decl.span,
        });
    }

    fn attach_impl(&mut self, file: FileId, block: &ImplBlock) {
        let Some(DeclRef::Struct(struct_id)) = self.names.get(&block.target.name).copied() else {
            self.diags.error(
                file,
                SemanticError::UnknownImplTarget {
                    name: block.target.name.clone(),
                    span: block.target.span.into(),
                },
                block.target.span,
            );
            return;
        };

        let trait_decl = match &block.trait_name {
            None => None,
            Some(name) => match self.names.get(&name.name).copied() {
                Some(DeclRef::Trait(trait_id)) => Some(Arc::clone(&self.traits[trait_id.index() as usize])),
                _ => {
                    self.diags.error(
                        file,
                        SemanticError::UnknownTrait {
                            name: name.name.clone(),
                            span: name.span.into(),
                        },
                        name.span,
                    );
                    None
                }
            },
        };

        let target = &mut self.structs[struct_id.index() as usize];
        if let Some(trait_decl) = trait_decl {
            if target.implements(&trait_decl.ident) {
                self.diags.error(
                    file,
                    SemanticError::DuplicateImpl {
                        type_name: target.ident.clone(),
                        trait_name: trait_decl.ident.clone(),
                        span: block.span.into(),
                    },
                    block.span,
                );
                return;
            }
            target.implements.push(TraitImpl {
                trait_decl,
                file,
                span: block.span,
            });
        }

        for method in &block.methods {
            let id = FnId::new(target.methods.len() as u32);
            target.methods.push(lower_fn(id, file, method));
        }
    }

    /// Report each cycle of aliases once and mark its members. An alias that
    /// mentions itself anywhere in its target (`type L: *L`) is a cycle too.
    fn mark_alias_cycles(&mut self) {
        let edges: Vec<Vec<usize>> = self
            .aliases
            .iter()
            .map(|alias| {
                let mut out = Vec::new();
                collect_alias_refs(&alias.target, &self.names, &mut out);
                out
            })
            .collect();

        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            node: usize,
            edges: &[Vec<usize>],
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
            cycles: &mut Vec<Vec<usize>>,
        ) {
            marks[node] = Mark::InProgress;
            stack.push(node);
            for &next in &edges[node] {
                match marks[next] {
                    Mark::Unvisited => visit(next, edges, marks, stack, cycles),
                    Mark::InProgress => {
                        if let Some(pos) = stack.iter().position(|&n| n == next) {
                            cycles.push(stack[pos..].to_vec());
                        }
                    }
                    Mark::Done => {}
                }
            }
            stack.pop();
            marks[node] = Mark::Done;
        }

        let mut marks = vec![Mark::Unvisited; self.aliases.len()];
        let mut cycles = Vec::new();
        for node in 0..self.aliases.len() {
            if marks[node] == Mark::Unvisited {
                visit(node, &edges, &mut marks, &mut Vec::new(), &mut cycles);
            }
        }

        let mut reported: FxHashSet<Vec<usize>> = FxHashSet::default();
        for mut cycle in cycles {
            // Rotate so the earliest declared alias leads the path
            if let Some(min_pos) = cycle.iter().enumerate().min_by_key(|(_, n)| **n).map(|(i, _)| i) {
                cycle.rotate_left(min_pos);
            }
            let mut members = cycle.clone();
            members.sort_unstable();
            if !reported.insert(members) {
                continue;
            }

            for &n in &cycle {
                self.aliases[n].cyclic = true;
            }
            let mut path: Vec<&str> = cycle.iter().map(|&n| self.aliases[n].ident.as_str()).collect();
            path.push(&self.aliases[cycle[0]].ident);
            let path = path.join(" -> ");

            let lead = &self.aliases[cycle[0]];
            let error = SemanticError::AliasCycle {
                name: lead.ident.clone(),
                path,
                span: lead.span.into(),
            };
            let (file, span) = (lead.file, lead.span);
            self.diags.error(file, error, span);
        }
    }
}

/// Alias indices mentioned anywhere inside `symbol`
fn collect_alias_refs(symbol: &TypeSymbol, names: &FxHashMap<String, DeclRef>, out: &mut Vec<usize>) {
    match &symbol.kind {
        TypeSymbolKind::Named { ident, args } => {
            if let Some(DeclRef::Alias(id)) = names.get(ident) {
                let index = id.index() as usize;
                if !out.contains(&index) {
                    out.push(index);
                }
            }
            for arg in args {
                collect_alias_refs(arg, names, out);
            }
        }
        TypeSymbolKind::Pointer(inner) | TypeSymbolKind::Reference(inner) | TypeSymbolKind::Slice(inner) => {
            collect_alias_refs(inner, names, out)
        }
        TypeSymbolKind::SelfType => {}
    }
}

fn lower_field(id: FieldId, field: &FieldDecl) -> Field {
    Field {
        id,
        ident: field.name.name.clone(),
        symbol: TypeSymbol::from(&field.ty),
        mutable: field.mutable,
        public: field.public,
        doc: field.doc.clone(),
        span: field.span,
    }
}

fn lower_signature(func: &FuncDecl) -> Signature {
    Signature {
        receiver: func.receiver,
        params: func
            .params
            .iter()
            .map(|p| Param {
                ident: p.name.name.clone(),
                symbol: TypeSymbol::from(&p.ty),
                span: p.span,
            })
            .collect(),
        return_type: func.return_type.as_ref().map(TypeSymbol::from),
    }
}

fn lower_fn(id: FnId, file: FileId, func: &FuncDecl) -> Fn {
    Fn {
        id,
        ident: func.name.name.clone(),
        signature: lower_signature(func),
        body: func.body,
        public: func.public,
        doc: func.doc.clone(),
        file,
        span: func.span,
    }
}
