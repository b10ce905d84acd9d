// src/commands/inspect.rs

use std::fmt::Write as _;
use std::fs;
use std::process::ExitCode;

use super::common::{expand_sources, render_failure, render_pipeline_error};
use crate::cli::{ColorMode, InspectType};
use crate::codegen::Names;
use crate::identity::FileId;
use crate::pipeline::{CompileOptions, SourceFile, compile, parse_source};
use crate::sema::{AnalysisOutput, DeclTable, GenericParam};

/// Inspect compilation output for the given files
pub fn inspect_files(
    patterns: &[String],
    inspect_type: InspectType,
    options: &CompileOptions,
    color_mode: ColorMode,
) -> ExitCode {
    let Some(files) = expand_sources(patterns) else {
        return ExitCode::FAILURE;
    };

    if let InspectType::Ast = inspect_type {
        return inspect_ast(&files, color_mode);
    }

    let compiled = match compile(&files, options) {
        Ok(compiled) => compiled,
        Err(failure) => {
            render_failure(&failure, &mut std::io::stderr(), color_mode);
            return ExitCode::FAILURE;
        }
    };

    match inspect_type {
        InspectType::Decls => print!("{}", format_decls(&compiled.analysis.table)),
        InspectType::Instances => {
            print!("{}", format_instances(&compiled.analysis));
            eprintln!("{}", compiled.analysis.stats);
        }
        InspectType::Ast => {}
    }
    ExitCode::SUCCESS
}

/// Parse each file on its own and dump its AST
fn inspect_ast(files: &[std::path::PathBuf], color_mode: ColorMode) -> ExitCode {
    let mut had_error = false;

    for (i, path) in files.iter().enumerate() {
        // Print separator between files
        if i > 0 {
            println!();
        }
        eprintln!("// {}", path.display());

        let text = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: could not read '{}': {}", path.display(), e);
                had_error = true;
                continue;
            }
        };

        let source = SourceFile {
            id: FileId::new(i as u32),
            path: path.clone(),
            text,
        };
        match parse_source(source.id, &source.text) {
            Ok(program) => println!("{:#?}", program),
            Err(e) => {
                render_pipeline_error(&e, std::slice::from_ref(&source), &mut std::io::stderr(), color_mode);
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn generics_suffix(generics: &[GenericParam]) -> String {
    if generics.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = generics.iter().map(|g| g.ident.as_str()).collect();
    format!("[{}]", names.join(", "))
}

/// Declaration table listing, in declaration order
pub fn format_decls(table: &DeclTable) -> String {
    let mut out = String::new();

    for decl in table.structs() {
        let native = if decl.native { "cpp " } else { "" };
        let _ = writeln!(out, "{}struct {}{}", native, decl.ident, generics_suffix(&decl.generics));
        for field in &decl.fields {
            let mutable = if field.mutable { "mut " } else { "" };
            let _ = writeln!(out, "    {}{}: {}", mutable, field.ident, field.symbol);
        }
        for imp in &decl.implements {
            let _ = writeln!(out, "    impl {}", imp.trait_decl.ident);
        }
        for method in &decl.methods {
            let _ = writeln!(out, "    {}", method.signature.display(&method.ident));
        }
    }

    for trait_decl in table.traits() {
        let _ = writeln!(out, "trait {}", trait_decl.ident);
        for method in &trait_decl.methods {
            let _ = writeln!(out, "    {}", method.signature.display(&method.ident));
        }
    }

    for alias in table.aliases() {
        let _ = writeln!(out, "type {} = {}", alias.ident, alias.target);
    }

    for func in table.functions() {
        let _ = writeln!(out, "{}", func.signature.display(&func.ident));
    }
    out
}

/// Every instance with its emitted name and resolved field types
pub fn format_instances(analysis: &AnalysisOutput) -> String {
    let names = Names::assign(&analysis.instances);
    let mut out = String::new();
    for ins in &analysis.instances {
        let native = if ins.is_native() { " (native)" } else { "" };
        let _ = writeln!(out, "{} => {}{}", ins.key, names.name(ins), native);
        for field in ins.fields() {
            let _ = writeln!(out, "    {}: {}", field.ident(), field.kind);
        }
    }
    out
}
