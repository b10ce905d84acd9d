// src/emitter/mod.rs
//! Main entry point for the C++ emitter.
//!
//! Turns the instances of a successful analysis into one header: prelude,
//! forward declarations, then definitions in value-dependency order.

use std::sync::Arc;

use pretty::{Arena, DocAllocator};
use rustc_hash::FxHashSet;
use wren_sema::{AnalysisOutput, StructIns, TypeKind};

use crate::config::EmitConfig;
use crate::printer::{self, Names};

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("cannot emit code: analysis reported {0} error(s)")]
    AnalysisFailed(usize),
    #[error("failed to render output")]
    Render(#[from] std::fmt::Error),
}

/// Result of emitting a program.
#[derive(Debug)]
pub struct EmitResult {
    /// The generated header
    pub output: String,
    /// Number of struct definitions emitted
    pub definitions: usize,
}

/// Emit C++ for every non-native instance of `analysis`.
#[tracing::instrument(level = "debug", skip_all, fields(instances = analysis.instances.len()))]
pub fn emit_program(analysis: &AnalysisOutput, config: EmitConfig) -> Result<EmitResult, EmitError> {
    if analysis.has_errors() {
        return Err(EmitError::AnalysisFailed(analysis.errors.len()));
    }
    emit_instances(&analysis.instances, config)
}

/// `instances` must be sorted by canonical key.
pub fn emit_instances(instances: &[Arc<StructIns>], config: EmitConfig) -> Result<EmitResult, EmitError> {
    let names = Names::assign(instances);
    let order = definition_order(instances);

    let arena = Arena::new();
    let mut sections = vec![printer::print_prelude(&arena, &native_includes(instances))];

    let forward: Vec<&str> = instances
        .iter()
        .filter(|ins| !ins.is_native())
        .map(|ins| names.name(ins))
        .collect();
    if !forward.is_empty() {
        sections.push(printer::print_forward_decls(&arena, &forward));
    }

    let mut emitted: FxHashSet<&str> = FxHashSet::default();
    for ins in &order {
        if !emitted.insert(ins.key.as_str()) {
            panic!("instance '{}' emitted twice", ins.key);
        }
        sections.push(printer::print_struct_def(&arena, ins, &names, config.nest()));
    }

    let doc = arena.intersperse(sections, arena.hardline().append(arena.hardline()));
    let mut output = String::new();
    doc.render_fmt(config.max_line_width as usize, &mut output)?;

    // Remove trailing whitespace from blank lines (artifact of nesting with hardlines)
    output = output
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    output.push('\n');

    tracing::debug!(definitions = emitted.len(), "emitted");
    Ok(EmitResult {
        output,
        definitions: emitted.len(),
    })
}

/// Non-native instances ordered so every by-value field type is defined
/// before the struct that contains it. Ties follow key order.
fn definition_order(instances: &[Arc<StructIns>]) -> Vec<&Arc<StructIns>> {
    fn visit<'i>(ins: &'i Arc<StructIns>, seen: &mut FxHashSet<&'i str>, order: &mut Vec<&'i Arc<StructIns>>) {
        if ins.is_native() || !seen.insert(ins.key.as_str()) {
            return;
        }
        for field in ins.fields() {
            if let TypeKind::Struct(dep) = &field.kind {
                visit(dep, seen, order);
            }
        }
        order.push(ins);
    }

    let mut seen = FxHashSet::default();
    let mut order = Vec::with_capacity(instances.len());
    for ins in instances {
        visit(ins, &mut seen, &mut order);
    }
    order
}

/// `#include` directives of native structs, in key order without repeats
fn native_includes(instances: &[Arc<StructIns>]) -> Vec<String> {
    let mut includes: Vec<String> = Vec::new();
    for ins in instances.iter().filter(|ins| ins.is_native()) {
        for directive in ins.decl.directives.iter().filter(|d| d.tag == "include") {
            let header = directive.args.concat();
            if !header.is_empty() && !includes.contains(&header) {
                includes.push(header);
            }
        }
    }
    includes
}

#[cfg(test)]
mod tests;
