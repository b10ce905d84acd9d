// src/lib.rs

// Public modules (the wren driver API)
pub mod cli;
pub mod commands;
pub mod errors;
pub mod pipeline;

// Internal crate aliases (not part of the public API).
// Tools should depend on the sub-crates (wren-sema, wren-codegen, etc.)
// directly for the types they need.
pub(crate) use wren_codegen as codegen;
pub(crate) use wren_frontend as frontend;
pub(crate) use wren_identity as identity;
pub(crate) use wren_sema as sema;
