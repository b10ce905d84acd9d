// generic.rs
//
// Generic instantiation engine: one live StructIns per canonical key, shared
// by every Phase 2 task.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxHashMap;

use crate::decls::Struct;
use crate::diagnostics::Diagnostics;
use crate::resolve::{Resolver, SubstitutionContext};
use crate::type_kind::{FieldIns, StructIns, TypeKind, TypeKindVec};

/// Instances created from one use before giving up. Reached only by structs
/// whose type arguments grow on every step, e.g. `next: *Inf[*T]`.
pub const MAX_INSTANTIATION_DEPTH: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InstantiateError {
    #[error("expected {expected} type arguments, found {found}")]
    WrongTypeArgCount { expected: usize, found: usize },
    #[error("instantiation nested deeper than {limit} levels")]
    TooDeep { limit: u32 },
}

/// Cache of struct instances keyed by canonical name.
///
/// Inserts are insert-if-absent: a shell instance is stored under its key
/// before its fields are resolved, so a struct that reaches itself through a
/// pointer finds the shell instead of recursing forever. Other threads that
/// find a shell wait for its fields, unless the builder is itself waiting on
/// them.
#[derive(Debug, Default)]
pub struct InstanceCache {
    instances: DashMap<String, Arc<StructIns>>,
    /// Threads blocked in `await_published`, and the shell each waits on
    waits: Mutex<FxHashMap<ThreadId, Arc<StructIns>>>,
    /// Number of cache hits. Uses AtomicU32 for thread-safe interior mutability.
    hits: AtomicU32,
    /// Number of cache misses. Uses AtomicU32 for thread-safe interior mutability.
    misses: AtomicU32,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the instance of `decl` for `args`.
    pub fn instantiate(
        &self,
        decl: &Arc<Struct>,
        args: TypeKindVec,
        resolver: &Resolver<'_>,
        diags: &mut Diagnostics,
    ) -> Result<Arc<StructIns>, InstantiateError> {
        self.instantiate_at(decl, args, resolver, 0, diags)
    }

    /// `depth` counts the instances being created on the way to this one.
    #[tracing::instrument(level = "trace", skip_all, fields(decl = %decl.ident, args = args.len(), depth = depth))]
    pub(crate) fn instantiate_at(
        &self,
        decl: &Arc<Struct>,
        args: TypeKindVec,
        resolver: &Resolver<'_>,
        depth: u32,
        diags: &mut Diagnostics,
    ) -> Result<Arc<StructIns>, InstantiateError> {
        if args.len() != decl.generics.len() {
            return Err(InstantiateError::WrongTypeArgCount {
                expected: decl.generics.len(),
                found: args.len(),
            });
        }

        // Native structs have one identity instance whatever the arguments
        let (key, args) = if decl.native {
            (decl.ident.clone(), TypeKindVec::new())
        } else {
            let texts: Vec<String> = args.iter().map(TypeKind::canonical_text).collect();
            (decl.canonical_name(&texts), args)
        };

        let found = self.instances.get(&key).map(|r| Arc::clone(r.value()));
        if let Some(ins) = found {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%key, "instance cache hit");
            self.await_published(&ins);
            return Ok(ins);
        }

        if depth >= MAX_INSTANTIATION_DEPTH {
            tracing::debug!(%key, depth, "instantiation too deep");
            return Err(InstantiateError::TooDeep {
                limit: MAX_INSTANTIATION_DEPTH,
            });
        }

        // The entry guard holds a shard lock; it must be released before
        // resolving fields, which may instantiate into the same shard.
        let ins = match self.instances.entry(key) {
            Entry::Occupied(existing) => {
                // Lost the race to another task
                self.hits.fetch_add(1, Ordering::Relaxed);
                let ins = Arc::clone(existing.get());
                drop(existing);
                self.await_published(&ins);
                return Ok(ins);
            }
            Entry::Vacant(slot) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let ins = Arc::new(StructIns::shell(Arc::clone(decl), args, slot.key().clone()));
                slot.insert(Arc::clone(&ins));
                ins
            }
        };
        tracing::trace!(key = %ins.key, "instance cache miss");

        let mut ctx = SubstitutionContext::empty(decl.file).at_depth(depth + 1);
        if decl.native {
            for param in &decl.generics {
                ctx.bind(param.ident.clone(), TypeKind::Opaque(param.ident.clone()));
            }
        } else {
            for (param, arg) in decl.generics.iter().zip(&ins.type_args) {
                ctx.bind(param.ident.clone(), arg.clone());
            }
        }

        let fields = decl
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let kind = resolver.resolve(&field.symbol, &ctx, diags);
                FieldIns::new(Arc::clone(decl), index, kind)
            })
            .collect();
        ins.publish_fields(fields);

        Ok(ins)
    }

    /// Block until `ins` has its fields, unless this thread is building it
    /// or its builder is, through other waiting threads, waiting on this one.
    /// The check and the wait registration happen under one lock, so two
    /// threads can never wait on each other.
    fn await_published(&self, ins: &Arc<StructIns>) {
        if ins.is_published() {
            return;
        }
        let me = thread::current().id();
        {
            let mut waits = self.waits.lock().unwrap_or_else(PoisonError::into_inner);
            let mut blocker = Some(Arc::clone(ins));
            while let Some(pending) = blocker {
                if pending.is_published() {
                    break;
                }
                if pending.builder() == me {
                    tracing::trace!(key = %ins.key, "instance built further up this thread");
                    return;
                }
                blocker = waits.get(&pending.builder()).cloned();
            }
            waits.insert(me, Arc::clone(ins));
        }

        tracing::trace!(key = %ins.key, "waiting for instance fields");
        ins.wait_published();
        self.waits.lock().unwrap_or_else(PoisonError::into_inner).remove(&me);
    }

    pub fn get(&self, key: &str) -> Option<Arc<StructIns>> {
        self.instances.get(key).map(|r| Arc::clone(r.value()))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// All instances sorted by canonical key
    pub fn instances(&self) -> Vec<Arc<StructIns>> {
        let mut all: Vec<Arc<StructIns>> = self.instances.iter().map(|r| Arc::clone(r.value())).collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    /// Get the cache hit rate as a percentage (0.0 - 100.0).
    /// Returns 0.0 if no lookups have been performed.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.instances.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of the cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[instances] entries: {}, lookups: {} (hits: {}, misses: {}, hit_rate: {:.1}%)",
            self.entries,
            self.hits + self.misses,
            self.hits,
            self.misses,
            self.hit_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use wren_identity::PrimitiveType;

    use super::*;
    use crate::decl_table::DeclTable;
    use crate::test_utils::table_from;

    fn int() -> TypeKind {
        TypeKind::Prim(PrimitiveType::Int)
    }

    fn string() -> TypeKind {
        TypeKind::Prim(PrimitiveType::Str)
    }

    fn instantiate(
        table: &DeclTable,
        cache: &InstanceCache,
        ident: &str,
        args: TypeKindVec,
    ) -> (Result<Arc<StructIns>, InstantiateError>, Diagnostics) {
        let resolver = Resolver::new(table, cache);
        let decl = table.lookup_struct(ident).unwrap();
        let mut diags = Diagnostics::new();
        let result = cache.instantiate(decl, args, &resolver, &mut diags);
        (result, diags)
    }

    #[test]
    fn equal_arguments_share_one_instance() {
        let table = table_from("struct Pair[T, U] { first: T, second: U }");
        let cache = InstanceCache::new();

        let (a, _) = instantiate(&table, &cache, "Pair", smallvec![int(), string()]);
        let (b, _) = instantiate(&table, &cache, "Pair", smallvec![int(), string()]);
        let (c, _) = instantiate(&table, &cache, "Pair", smallvec![string(), int()]);
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.key, "Pair[int,str]");
        assert_eq!(c.key, "Pair[str,int]");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn fields_are_substituted_in_declaration_order() {
        let table = table_from("struct Pair[T, U] { first: T, second: []U, third: *Pair[U, T] }");
        let cache = InstanceCache::new();

        let (ins, diags) = instantiate(&table, &cache, "Pair", smallvec![int(), string()]);
        let ins = ins.unwrap();
        assert!(diags.is_empty());

        let fields: Vec<(&str, String)> = ins.fields().iter().map(|f| (f.ident(), f.kind.to_string())).collect();
        assert_eq!(
            fields,
            vec![
                ("first", "int".to_string()),
                ("second", "[]str".to_string()),
                ("third", "*Pair[str,int]".to_string()),
            ]
        );
        // The swapped instance was created on the way and closes the loop
        let swapped = cache.get("Pair[str,int]").unwrap();
        let back = swapped.fields()[2].kind.clone();
        assert_eq!(back, TypeKind::Ptr(Box::new(TypeKind::Struct(ins))));
    }

    #[test]
    fn wrong_arity_creates_nothing() {
        let table = table_from("struct Box[T] { value: T }");
        let cache = InstanceCache::new();

        let (result, _) = instantiate(&table, &cache, "Box", TypeKindVec::new());
        assert_eq!(
            result.unwrap_err(),
            InstantiateError::WrongTypeArgCount { expected: 1, found: 0 }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn recursive_generic_struct_terminates() {
        let table = table_from("struct Node[T] { value: T, next: *Node[T] }");
        let cache = InstanceCache::new();

        let (ins, diags) = instantiate(&table, &cache, "Node", smallvec![int()]);
        let ins = ins.unwrap();
        assert!(diags.is_empty());
        assert_eq!(cache.len(), 1);
        assert_eq!(ins.fields()[1].kind, TypeKind::Ptr(Box::new(TypeKind::Struct(Arc::clone(&ins)))));
    }

    #[test]
    fn native_struct_has_one_opaque_instance() {
        let table = table_from("cpp struct Handle[T] { raw: *T }");
        let cache = InstanceCache::new();

        let (a, _) = instantiate(&table, &cache, "Handle", smallvec![int()]);
        let (b, _) = instantiate(&table, &cache, "Handle", smallvec![string()]);
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.key, "Handle");
        assert!(a.type_args.is_empty());
        assert_eq!(a.fields()[0].kind, TypeKind::Ptr(Box::new(TypeKind::Opaque("T".into()))));
    }

    #[test]
    fn concurrent_instantiation_yields_one_instance() {
        let table = table_from("struct Pair[T, U] { first: T, second: *Pair[U, T] }");
        let cache = InstanceCache::new();

        let results: Vec<Arc<StructIns>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| instantiate(&table, &cache, "Pair", smallvec![int(), string()]).0.unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for ins in &results {
            assert!(Arc::ptr_eq(ins, &results[0]));
            assert!(ins.is_published());
            let fields: Vec<(&str, String)> = ins.fields().iter().map(|f| (f.ident(), f.kind.to_string())).collect();
            assert_eq!(
                fields,
                vec![("first", "int".to_string()), ("second", "*Pair[str,int]".to_string())]
            );
        }
        assert_eq!(cache.len(), 2);
        let keys: Vec<String> = cache.instances().iter().map(|i| i.key.clone()).collect();
        assert_eq!(keys, vec!["Pair[int,str]", "Pair[str,int]"]);
    }

    #[test]
    fn instances_seen_by_other_threads_are_complete() {
        let fields: Vec<String> = (0..24).map(|i| format!("f{i}: Pair[T, Pair[T, int]]")).collect();
        let source = format!(
            "struct Pair[T, U] {{ first: T, second: U }}\nstruct Big[T] {{ {} }}",
            fields.join(", ")
        );
        let table = table_from(&source);

        for _ in 0..20 {
            let cache = InstanceCache::new();
            let results: Vec<Arc<StructIns>> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|_| scope.spawn(|| instantiate(&table, &cache, "Big", smallvec![string()]).0.unwrap()))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            for ins in &results {
                assert!(Arc::ptr_eq(ins, &results[0]));
                assert!(ins.is_published());
                assert_eq!(ins.fields().len(), 24);
                for field in ins.fields() {
                    assert_eq!(field.kind.to_string(), "Pair[str,Pair[str,int]]");
                }
            }
            let inner = cache.get("Pair[str,int]").unwrap();
            assert!(inner.is_published());
            assert_eq!(inner.fields().len(), 2);
        }
    }

    #[test]
    fn mutually_recursive_instances_built_from_both_ends() {
        let table = table_from("struct A[T] { b: *B[T] }\nstruct B[T] { a: *A[T] }");

        for _ in 0..50 {
            let cache = InstanceCache::new();
            let results: Vec<Arc<StructIns>> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|i| {
                        let (table, cache) = (&table, &cache);
                        let ident = if i % 2 == 0 { "A" } else { "B" };
                        scope.spawn(move || instantiate(table, cache, ident, smallvec![int()]).0.unwrap())
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            for ins in &results {
                assert!(ins.is_published());
                assert_eq!(ins.fields().len(), 1);
            }
            assert_eq!(cache.len(), 2);
            let a = cache.get("A[int]").unwrap();
            let b = cache.get("B[int]").unwrap();
            assert_eq!(a.fields()[0].kind, TypeKind::Ptr(Box::new(TypeKind::Struct(Arc::clone(&b)))));
            assert_eq!(b.fields()[0].kind, TypeKind::Ptr(Box::new(TypeKind::Struct(a))));
        }
    }

    #[test]
    fn growing_arguments_stop_at_the_depth_limit() {
        let table = table_from("struct Inf[T] { next: *Inf[*T] }");
        let cache = InstanceCache::new();

        let (ins, diags) = instantiate(&table, &cache, "Inf", smallvec![int()]);
        let ins = ins.unwrap();
        assert!(ins.is_published());
        assert_eq!(cache.len(), MAX_INSTANTIATION_DEPTH as usize);
        assert!(!diags.is_empty());
    }

    #[test]
    fn stats_display_matches_counters() {
        let cache = InstanceCache::new();
        assert_eq!(cache.hit_rate(), 0.0);
        assert_eq!(
            cache.stats().to_string(),
            "[instances] entries: 0, lookups: 0 (hits: 0, misses: 0, hit_rate: 0.0%)"
        );
    }
}
