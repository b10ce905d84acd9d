// src/commands/check.rs

use std::process::ExitCode;

use super::common::{expand_sources, render_failure};
use crate::cli::ColorMode;
use crate::pipeline::{CompileOptions, compile};

/// Check wren source files (parse + semantic analysis, no output)
pub fn check_files(patterns: &[String], options: &CompileOptions, color_mode: ColorMode) -> ExitCode {
    let Some(files) = expand_sources(patterns) else {
        return ExitCode::FAILURE;
    };

    match compile(&files, options) {
        Ok(compiled) => {
            tracing::info!(
                files = compiled.sources.len(),
                instances = compiled.analysis.instances.len(),
                "check passed"
            );
            ExitCode::SUCCESS
        }
        Err(failure) => {
            render_failure(&failure, &mut std::io::stderr(), color_mode);
            ExitCode::FAILURE
        }
    }
}
