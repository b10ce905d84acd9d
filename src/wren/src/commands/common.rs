// src/commands/common.rs
//! Shared utilities for CLI commands.

use std::io::Write;
use std::path::PathBuf;

use miette::{Diagnostic, NamedSource};

use crate::cli::{ColorMode, SOURCE_EXTENSION, expand_paths};
use crate::errors::render_to_writer_terminal;
use crate::identity::FileId;
use crate::pipeline::{CompileFailure, PipelineError, SourceFile};

/// Expand CLI path patterns, printing an error when nothing usable is found.
pub fn expand_sources(patterns: &[String]) -> Option<Vec<PathBuf>> {
    let files = match expand_paths(patterns) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            return None;
        }
    };

    if files.is_empty() {
        eprintln!("error: no .{} files found", SOURCE_EXTENSION);
        return None;
    }
    Some(files)
}

/// Render one diagnostic with the source of `file` attached.
fn render_with_source<D>(err: D, file: Option<&SourceFile>, w: &mut dyn Write, color_mode: ColorMode)
where
    D: Diagnostic + Send + Sync + 'static,
{
    let report = match file {
        Some(file) => {
            miette::Report::new(err).with_source_code(NamedSource::new(file.display_path(), file.text.clone()))
        }
        None => miette::Report::new(err),
    };
    let _ = render_to_writer_terminal(report.as_ref(), w, color_mode);
}

/// Render a pipeline error to a writer with source context.
pub fn render_pipeline_error(
    err: &PipelineError,
    sources: &[SourceFile],
    w: &mut dyn Write,
    color_mode: ColorMode,
) {
    let source = |id: FileId| sources.iter().find(|s| s.id == id);
    match err {
        PipelineError::Lex { file, errors } => {
            let file = source(*file);
            for e in errors {
                render_with_source(e.clone(), file, w, color_mode);
            }
        }
        PipelineError::Parse { file, errors } => {
            let file = source(*file);
            for e in errors {
                render_with_source(e.error.clone(), file, w, color_mode);
            }
        }
        PipelineError::Sema(errors) => {
            for e in errors {
                render_with_source(e.error.clone(), source(e.file), w, color_mode);
            }
        }
        PipelineError::Io { .. } | PipelineError::Threads(_) => {
            let _ = writeln!(w, "error: {}", err);
        }
    }
}

/// Render every error of a failed compilation followed by a summary line.
pub fn render_failure(failure: &CompileFailure, w: &mut dyn Write, color_mode: ColorMode) {
    for err in &failure.errors {
        render_pipeline_error(err, &failure.sources, w, color_mode);
    }
    let count = failure.error_count();
    let _ = writeln!(
        w,
        "error: could not compile due to {} previous error{}",
        count,
        if count == 1 { "" } else { "s" }
    );
}
