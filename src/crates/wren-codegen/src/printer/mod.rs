//! Struct instances to pretty::Doc conversion.

mod decl;
mod types;

use std::sync::Arc;

use pretty::{Arena, DocAllocator, DocBuilder};
use rustc_hash::{FxHashMap, FxHashSet};

use wren_sema::StructIns;

pub(crate) use decl::print_struct_def;
pub(crate) use types::primitive_name;

/// Headers every translation unit needs for the primitive mapping
const PRELUDE_INCLUDES: [&str; 5] = ["<any>", "<cstddef>", "<cstdint>", "<string>", "<vector>"];

/// Emitted identifier of every instance.
///
/// Non-generic and native instances keep their identifier. Generic instances
/// get `Ident_N`, numbered from 1 in canonical key order, skipping names that
/// a declared struct already uses.
#[derive(Debug, Default)]
pub struct Names {
    by_key: FxHashMap<String, String>,
}

impl Names {
    /// `instances` must be sorted by key
    pub fn assign(instances: &[Arc<StructIns>]) -> Self {
        let taken: FxHashSet<&str> = instances
            .iter()
            .filter(|ins| ins.is_native() || !ins.decl.is_generic())
            .map(|ins| ins.ident())
            .collect();

        let mut counters: FxHashMap<&str, u32> = FxHashMap::default();
        let mut by_key = FxHashMap::default();
        for ins in instances {
            let name = if ins.is_native() || !ins.decl.is_generic() {
                ins.ident().to_string()
            } else {
                let counter = counters.entry(ins.ident()).or_insert(0);
                loop {
                    *counter += 1;
                    let candidate = format!("{}_{}", ins.ident(), counter);
                    if !taken.contains(candidate.as_str()) {
                        break candidate;
                    }
                }
            };
            by_key.insert(ins.key.clone(), name);
        }
        Self { by_key }
    }

    pub fn name<'s>(&'s self, ins: &'s StructIns) -> &'s str {
        self.by_key.get(&ins.key).map(String::as_str).unwrap_or(ins.ident())
    }
}

/// Banner and `#include` lines
pub(crate) fn print_prelude<'a>(arena: &'a Arena<'a>, native_includes: &[String]) -> DocBuilder<'a, Arena<'a>> {
    let mut lines = vec![
        arena.text("// Generated by wren. Do not edit."),
        arena.text("#pragma once"),
        arena.nil(),
    ];
    lines.extend(PRELUDE_INCLUDES.iter().map(|h| arena.text(format!("#include {h}"))));
    lines.extend(
        native_includes
            .iter()
            .filter(|h| !PRELUDE_INCLUDES.contains(&h.as_str()))
            .map(|h| arena.text(format!("#include {h}"))),
    );
    arena.intersperse(lines, arena.hardline())
}

/// `struct Name;` for each name
pub(crate) fn print_forward_decls<'a>(arena: &'a Arena<'a>, names: &[&str]) -> DocBuilder<'a, Arena<'a>> {
    let lines: Vec<_> = names
        .iter()
        .map(|name| arena.text(format!("struct {name};")))
        .collect();
    arena.intersperse(lines, arena.hardline())
}

/// Doc comment lines (`/// …`), each followed by a line break
pub(super) fn print_doc<'a>(arena: &'a Arena<'a>, doc: &str) -> DocBuilder<'a, Arena<'a>> {
    if doc.is_empty() {
        return arena.nil();
    }
    let lines: Vec<_> = doc
        .lines()
        .map(|line| {
            let text = if line.is_empty() { "///".to_string() } else { format!("/// {line}") };
            arena.text(text).append(arena.hardline())
        })
        .collect();
    arena.concat(lines)
}
