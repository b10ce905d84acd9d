// src/errors/mod.rs
//! Structured error reporting for the wren compiler.
//!
//! This module provides error types using miette for fancy diagnostics.

pub mod report;

// Re-export frontend errors
pub use wren_frontend::errors::{LexerError, ParserError};

// Re-export sema errors
pub use wren_sema::errors::{SemanticError, TypeError};

pub use report::{render_to_string, render_to_writer_terminal, snapshot_handler, terminal_handler};
