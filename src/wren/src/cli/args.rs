// src/cli/args.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands::version::version_string;

/// Color output mode
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// What `inspect` prints
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InspectType {
    /// Parsed declarations of each file
    Ast,
    /// The global declaration table
    Decls,
    /// Canonical struct instances and their field types
    Instances,
}

/// Wren to C++ translator
#[derive(Parser)]
#[command(name = "wren")]
#[command(version = version_string())]
#[command(about = "Wren struct and generics compiler", long_about = None)]
pub struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Worker threads for parsing and analysis (default: one per core)
    #[arg(short, long, global = true, value_name = "N")]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check source files for errors without emitting code
    #[command(visible_alias = "c")]
    Check {
        /// Paths to check (files, directories, or glob patterns)
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<String>,
    },
    /// Translate source files into one C++ header
    #[command(visible_alias = "b")]
    Build {
        /// Paths to compile (files, directories, or glob patterns)
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<String>,

        /// Write the header here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Inspect compilation output (AST, declarations, instances)
    #[command(visible_alias = "i")]
    Inspect {
        /// What to inspect: ast, decls, instances
        #[arg(value_name = "TYPE")]
        inspect_type: InspectType,

        /// Paths to inspect (files or glob patterns)
        #[arg(value_name = "FILES", required = true)]
        files: Vec<String>,
    },
    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["wren", "build", "src", "-o", "out.hpp", "--jobs", "2"]).unwrap();
        assert_eq!(cli.jobs, Some(2));
        match cli.command {
            Commands::Build { paths, output } => {
                assert_eq!(paths, vec!["src"]);
                assert_eq!(output, Some(PathBuf::from("out.hpp")));
            }
            _ => panic!("expected build"),
        }
    }
}
