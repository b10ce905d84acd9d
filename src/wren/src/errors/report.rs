// src/errors/report.rs
//! Rendering utilities for miette diagnostics.

use std::io::{IsTerminal, Write};

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, ThemeCharacters, ThemeStyles};

use crate::cli::ColorMode;

/// Create a handler for terminal output (unicode + colors).
pub fn terminal_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles: ThemeStyles::ansi(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Create a handler for snapshot testing (ascii + no colors).
pub fn snapshot_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Render to a buffer without colors (for snapshots/testing).
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let handler = snapshot_handler();
    let _ = handler.render_report(&mut output, report);
    output
}

/// Render to `writer`, with unicode and colors when `color_mode` allows.
/// `Auto` follows whether stderr is a terminal.
pub fn render_to_writer_terminal(
    report: &dyn Diagnostic,
    writer: &mut dyn Write,
    color_mode: ColorMode,
) -> std::io::Result<()> {
    let colored = match color_mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stderr().is_terminal(),
    };
    let handler = if colored { terminal_handler() } else { snapshot_handler() };
    let mut output = String::new();
    if handler.render_report(&mut output, report).is_err() {
        return Ok(());
    }
    writer.write_all(output.as_bytes())
}
