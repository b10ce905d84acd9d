// analyzer.rs
//
// Phase 2 driver: declaration table, signature checks, instantiation,
// trait conformance and the value-cycle check.

use std::sync::Arc;

use rayon::prelude::*;

use crate::conformance::{ConformanceError, check_conformance};
use crate::cycles::check_value_cycles;
use crate::decl_table::{DeclTable, FileUnit};
use crate::decls::{Signature, Struct};
use crate::diagnostics::Diagnostics;
use crate::errors::TypeError;
use crate::generic::{CacheStats, InstanceCache};
use crate::resolve::{GenericScope, Resolver, SubstitutionContext};
use crate::type_kind::{StructIns, TypeKind, TypeKindVec};

/// Everything later stages need from semantic analysis
#[derive(Debug)]
pub struct AnalysisOutput {
    pub table: DeclTable,
    /// Every struct instance, sorted by canonical key
    pub instances: Vec<Arc<StructIns>>,
    pub conformance: Vec<ConformanceError>,
    /// All errors, sorted by file and position
    pub errors: Vec<TypeError>,
    pub stats: CacheStats,
}

impl AnalysisOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn instance(&self, key: &str) -> Option<&Arc<StructIns>> {
        self.instances
            .binary_search_by(|ins| ins.key.as_str().cmp(key))
            .ok()
            .map(|i| &self.instances[i])
    }
}

/// Analyze all parsed files of a compilation. Runs on the current rayon pool.
#[tracing::instrument(level = "debug", skip_all, fields(files = units.len()))]
pub fn analyze(units: &[FileUnit]) -> AnalysisOutput {
    let (table, build_errors) = DeclTable::build(units);
    let mut diags = Diagnostics::new();
    diags.extend(build_errors);

    let cache = InstanceCache::new();
    let resolver = Resolver::new(&table, &cache);

    // Symbols inside generic declarations are checked without instantiation
    let checked: Vec<Diagnostics> = table
        .structs()
        .par_iter()
        .map(|decl| check_struct(&resolver, decl))
        .collect();
    for d in checked {
        diags.append(d);
    }
    check_other_decls(&resolver, &mut diags);
    tracing::debug!(errors = diags.len(), "declarations checked");

    // Closed uses create the instances codegen needs
    let resolved: Vec<Diagnostics> = table
        .structs()
        .par_iter()
        .filter(|decl| decl.native || !decl.is_generic())
        .map(|decl| instantiate_root(&resolver, decl))
        .collect();
    for d in resolved {
        diags.append(d);
    }
    resolve_other_decls(&resolver, &mut diags);
    tracing::debug!(instances = cache.len(), "instantiation done");

    let conformance: Vec<ConformanceError> = table
        .structs()
        .par_iter()
        .flat_map_iter(|decl| check_conformance(decl, &table))
        .collect();
    diags.extend(conformance.iter().cloned().map(ConformanceError::into_type_error));

    let instances = cache.instances();
    diags.extend(check_value_cycles(&instances));

    let stats = cache.stats();
    tracing::debug!(%stats, "analysis done");

    AnalysisOutput {
        instances,
        conformance,
        errors: diags.into_sorted(),
        stats,
        table,
    }
}

fn check_signature(resolver: &Resolver<'_>, signature: &Signature, scope: GenericScope<'_>, diags: &mut Diagnostics) {
    for param in &signature.params {
        resolver.check(&param.symbol, scope, diags);
    }
    if let Some(ret) = &signature.return_type {
        resolver.check(ret, scope, diags);
    }
}

fn check_struct(resolver: &Resolver<'_>, decl: &Struct) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let scope = GenericScope::new(decl.file, &decl.generics);
    for field in &decl.fields {
        resolver.check(&field.symbol, scope, &mut diags);
    }
    for method in &decl.methods {
        let scope = GenericScope::new(method.file, &decl.generics).allowing_self();
        check_signature(resolver, &method.signature, scope, &mut diags);
    }
    diags
}

fn check_other_decls(resolver: &Resolver<'_>, diags: &mut Diagnostics) {
    let table = resolver.table();
    for trait_decl in table.traits() {
        let scope = GenericScope::new(trait_decl.file, &[]).allowing_self();
        for method in &trait_decl.methods {
            check_signature(resolver, &method.signature, scope, diags);
        }
    }
    for alias in table.aliases() {
        resolver.check(&alias.target, GenericScope::new(alias.file, &[]), diags);
    }
    for func in table.functions() {
        check_signature(resolver, &func.signature, GenericScope::new(func.file, &[]), diags);
    }
}

/// Instantiate a non-generic (or native) struct and resolve its method
/// signatures with `Self` bound to the instance.
fn instantiate_root(resolver: &Resolver<'_>, decl: &Arc<Struct>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let args: TypeKindVec = decl
        .generics
        .iter()
        .map(|g| TypeKind::Opaque(g.ident.clone()))
        .collect();

    let ins = match resolver.cache().instantiate(decl, args, resolver, &mut diags) {
        Ok(ins) => ins,
        Err(err) => {
            // Arity always matches here
            tracing::error!(decl = %decl.ident, %err, "root instantiation failed");
            return diags;
        }
    };

    if decl.is_generic() {
        return diags;
    }
    for method in &decl.methods {
        let self_type = TypeKind::instance(Arc::clone(&ins), TypeKindVec::new());
        let ctx = SubstitutionContext::empty(method.file).with_self(self_type);
        resolve_signature(resolver, &method.signature, &ctx, &mut diags);
    }
    diags
}

fn resolve_signature(resolver: &Resolver<'_>, signature: &Signature, ctx: &SubstitutionContext, diags: &mut Diagnostics) {
    for param in &signature.params {
        resolver.resolve(&param.symbol, ctx, diags);
    }
    if let Some(ret) = &signature.return_type {
        resolver.resolve(ret, ctx, diags);
    }
}

fn resolve_other_decls(resolver: &Resolver<'_>, diags: &mut Diagnostics) {
    let table = resolver.table();
    for alias in table.aliases().iter().filter(|a| !a.cyclic) {
        resolver.resolve(&alias.target, &SubstitutionContext::empty(alias.file), diags);
    }
    for func in table.functions() {
        resolve_signature(resolver, &func.signature, &SubstitutionContext::empty(func.file), diags);
    }
}
