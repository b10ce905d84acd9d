//! C++ emitter for analyzed wren programs.

pub mod config;
pub mod emitter;
mod printer;

pub use config::{CANONICAL, EmitConfig};
pub use emitter::{EmitError, EmitResult, emit_instances, emit_program};
pub use printer::Names;
