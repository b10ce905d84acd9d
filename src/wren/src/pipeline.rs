// src/pipeline.rs
//! Two-phase compilation pipeline.
//!
//! Phase 1 reads, tokenizes and parses every file in parallel. After the
//! barrier, Phase 2 runs semantic analysis over all files at once and is
//! skipped entirely when any file failed.

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::errors::{LexerError, TypeError};
use crate::frontend::{Lexer, ParseError, Parser, Program};
use crate::identity::FileId;
use crate::sema::{AnalysisOutput, FileUnit, analyze};

/// Options shared by every command that compiles.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Worker threads; `None` uses rayon's global pool
    pub jobs: Option<usize>,
}

/// A source file that was read successfully
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Errors that can occur during the compilation pipeline.
///
/// Each variant carries the structured error data from the failed phase.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Lexer encountered invalid tokens
    #[error("{} lexical error(s)", .errors.len())]
    Lex { file: FileId, errors: Vec<LexerError> },
    /// Parser encountered syntax errors
    #[error("{} syntax error(s)", .errors.len())]
    Parse { file: FileId, errors: Vec<ParseError> },
    /// Semantic analysis failed
    #[error("{} semantic error(s)", .0.len())]
    Sema(Vec<TypeError>),
    /// The worker pool could not be created
    #[error("could not start worker threads: {0}")]
    Threads(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Number of individual diagnostics carried
    pub fn count(&self) -> usize {
        match self {
            PipelineError::Lex { errors, .. } => errors.len(),
            PipelineError::Parse { errors, .. } => errors.len(),
            PipelineError::Sema(errors) => errors.len(),
            PipelineError::Io { .. } | PipelineError::Threads(_) => 1,
        }
    }
}

/// Output of Phase 1 for one file
#[derive(Debug)]
enum FileOutcome {
    Unreadable(PipelineError),
    Parsed(SourceFile, Program),
    Failed(SourceFile, PipelineError),
}

/// Output of a successful compilation
#[derive(Debug)]
pub struct Compiled {
    pub sources: Vec<SourceFile>,
    pub units: Vec<FileUnit>,
    pub analysis: AnalysisOutput,
}

/// A failed compilation: the sources that could be read, for rendering, and
/// every error of the phase that failed.
#[derive(Debug)]
pub struct CompileFailure {
    pub sources: Vec<SourceFile>,
    pub errors: Vec<PipelineError>,
}

impl CompileFailure {
    pub fn source(&self, id: FileId) -> Option<&SourceFile> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn error_count(&self) -> usize {
        self.errors.iter().map(PipelineError::count).sum()
    }
}

/// Compile `paths` as one program. File ids follow the order of `paths`.
pub fn compile(paths: &[PathBuf], options: &CompileOptions) -> Result<Compiled, CompileFailure> {
    match options.jobs {
        None => compile_on_current_pool(paths),
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| CompileFailure {
                    sources: Vec::new(),
                    errors: vec![e.into()],
                })?;
            pool.install(|| compile_on_current_pool(paths))
        }
    }
}

fn compile_on_current_pool(paths: &[PathBuf]) -> Result<Compiled, CompileFailure> {
    // Phase 1: one task per file; a failing file never cancels its siblings
    let outcomes: Vec<FileOutcome> = {
        let _span = tracing::info_span!("parse", files = paths.len()).entered();
        paths
            .par_iter()
            .enumerate()
            .map(|(i, path)| parse_file(FileId::new(i as u32), path))
            .collect()
    };

    // Barrier: every task has finished
    let mut sources = Vec::with_capacity(outcomes.len());
    let mut units = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Parsed(source, program) => {
                units.push(FileUnit::new(source.id, program));
                sources.push(source);
            }
            FileOutcome::Failed(source, error) => {
                sources.push(source);
                errors.push(error);
            }
            FileOutcome::Unreadable(error) => errors.push(error),
        }
    }
    tracing::debug!(parsed = units.len(), failed = errors.len(), "phase 1 done");

    if !errors.is_empty() {
        tracing::debug!("skipping phase 2");
        return Err(CompileFailure { sources, errors });
    }

    // Phase 2
    let analysis = {
        let _span = tracing::info_span!("sema").entered();
        analyze(&units)
    };
    if analysis.has_errors() {
        return Err(CompileFailure {
            sources,
            errors: vec![PipelineError::Sema(analysis.errors)],
        });
    }

    Ok(Compiled {
        sources,
        units,
        analysis,
    })
}

/// Read, tokenize and parse one file. A file with lexical errors is not parsed.
#[tracing::instrument(level = "debug", skip_all, fields(file = %path.display()))]
fn parse_file(id: FileId, path: &Path) -> FileOutcome {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) => {
            return FileOutcome::Unreadable(PipelineError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let result = parse_source(id, &text);
    let source = SourceFile {
        id,
        path: path.to_path_buf(),
        text,
    };
    match result {
        Ok(program) => FileOutcome::Parsed(source, program),
        Err(error) => FileOutcome::Failed(source, error),
    }
}

/// Tokenize and parse in-memory source
pub fn parse_source(id: FileId, text: &str) -> Result<Program, PipelineError> {
    let (tokens, lex_errors) = Lexer::new(text).tokenize();
    if !lex_errors.is_empty() {
        return Err(PipelineError::Lex {
            file: id,
            errors: lex_errors,
        });
    }

    let program = Parser::new(tokens)
        .parse_program()
        .map_err(|errors| PipelineError::Parse { file: id, errors })?;
    tracing::debug!(declarations = program.declarations.len(), "parsed");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_files(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let paths = files
            .iter()
            .map(|(name, text)| {
                let path = dir.path().join(name);
                fs::write(&path, text).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn compiles_across_files() {
        let (_dir, paths) = write_files(&[
            ("a.wr", "struct Pair[T, U] { first: T, second: U }"),
            ("b.wr", "struct Use { p: Pair[int, str] }"),
        ]);
        let compiled = compile(&paths, &CompileOptions::default()).unwrap();
        assert_eq!(compiled.sources.len(), 2);
        let keys: Vec<&str> = compiled.analysis.instances.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["Pair[int,str]", "Use"]);
    }

    #[test]
    fn phase_two_is_skipped_after_a_parse_failure() {
        // b.wr alone would be a semantic error; it must not be reported
        let (_dir, paths) = write_files(&[
            ("a.wr", "struct Broken {"),
            ("b.wr", "struct Ok { x: Missing }"),
            ("c.wr", "struct Lex { x: int } @"),
        ]);
        let failure = compile(&paths, &CompileOptions { jobs: Some(2) }).unwrap_err();
        assert_eq!(failure.sources.len(), 3);
        assert_eq!(failure.errors.len(), 2);
        assert!(matches!(failure.errors[0], PipelineError::Parse { file, .. } if file == FileId::new(0)));
        assert!(matches!(failure.errors[1], PipelineError::Lex { file, .. } if file == FileId::new(2)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let (dir, mut paths) = write_files(&[("a.wr", "struct A { x: int }")]);
        paths.push(dir.path().join("missing.wr"));
        let failure = compile(&paths, &CompileOptions::default()).unwrap_err();
        assert_eq!(failure.sources.len(), 1);
        assert!(matches!(failure.errors[0], PipelineError::Io { .. }));
    }

    #[test]
    fn semantic_errors_are_collected() {
        let (_dir, paths) = write_files(&[("a.wr", "struct A { x: Missing, y: Gone }")]);
        let failure = compile(&paths, &CompileOptions::default()).unwrap_err();
        assert_eq!(failure.error_count(), 2);
        assert!(failure.source(FileId::new(0)).is_some());
    }
}
