// src/commands/build.rs

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use super::common::{expand_sources, render_failure};
use crate::cli::ColorMode;
use crate::codegen::{CANONICAL, emit_program};
use crate::pipeline::{CompileOptions, compile};

/// Compile source files into a single C++ header, written to `output` or stdout.
pub fn build_files(
    patterns: &[String],
    output: Option<&Path>,
    options: &CompileOptions,
    color_mode: ColorMode,
) -> ExitCode {
    let Some(files) = expand_sources(patterns) else {
        return ExitCode::FAILURE;
    };

    let compiled = match compile(&files, options) {
        Ok(compiled) => compiled,
        Err(failure) => {
            render_failure(&failure, &mut std::io::stderr(), color_mode);
            return ExitCode::FAILURE;
        }
    };

    let emitted = match emit_program(&compiled.analysis, CANONICAL) {
        Ok(emitted) => emitted,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(definitions = emitted.definitions, "emitted");

    let written = match output {
        Some(path) => fs::write(path, &emitted.output).map_err(|e| (path.display().to_string(), e)),
        None => std::io::stdout()
            .lock()
            .write_all(emitted.output.as_bytes())
            .map_err(|e| ("<stdout>".to_string(), e)),
    };
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err((target, e)) => {
            eprintln!("error: could not write '{}': {}", target, e);
            ExitCode::FAILURE
        }
    }
}
