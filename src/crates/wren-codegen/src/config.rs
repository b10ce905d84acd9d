// src/config.rs
//! Configuration for the C++ emitter.
//!
//! Output style is not user-configurable. This struct keeps the layout rules
//! centralized and testable.

/// Emitter configuration. All values are fixed for canonical output.
#[derive(Debug, Clone, Copy)]
pub struct EmitConfig {
    /// Number of spaces per indentation level
    pub indent_width: u8,
    /// Maximum line width (soft limit for breaking decisions)
    pub max_line_width: u16,
}

impl Default for EmitConfig {
    fn default() -> Self {
        CANONICAL
    }
}

/// The canonical output style.
pub const CANONICAL: EmitConfig = EmitConfig {
    indent_width: 4,
    max_line_width: 100,
};

impl EmitConfig {
    /// Nesting amount for `pretty` documents
    pub fn nest(&self) -> isize {
        self.indent_width as isize
    }
}
