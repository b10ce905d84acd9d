// diagnostics.rs
//
// Accumulates semantic errors. Each parallel task owns its own sink and the
// sinks are merged once the task set joins.

use wren_identity::{FileId, Span};

use crate::errors::{SemanticError, TypeError};

#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<TypeError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, file: FileId, error: SemanticError, span: Span) {
        tracing::trace!(file = file.index(), %error, "semantic error");
        self.errors.push(TypeError::new(error, span, file));
    }

    pub fn push(&mut self, error: TypeError) {
        self.errors.push(error);
    }

    pub fn append(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeError> {
        self.errors.iter()
    }

    /// Errors ordered by file then position, with exact repeats removed.
    /// The same declaration can be reached from several instantiations, so
    /// repeats are expected.
    pub fn into_sorted(mut self) -> Vec<TypeError> {
        self.errors.sort_by(|a, b| {
            (a.file, a.span.start, a.span.end)
                .cmp(&(b.file, b.span.start, b.span.end))
                .then_with(|| a.error.to_string().cmp(&b.error.to_string()))
        });
        self.errors.dedup();
        self.errors
    }
}

impl Extend<TypeError> for Diagnostics {
    fn extend<I: IntoIterator<Item = TypeError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(name: &str, start: usize) -> (SemanticError, Span) {
        let span = Span::new(start, start + name.len(), 1, start as u32 + 1);
        (
            SemanticError::UnknownType {
                name: name.to_string(),
                span: span.into(),
            },
            span,
        )
    }

    #[test]
    fn sorted_output_drops_exact_repeats() {
        let mut diags = Diagnostics::new();
        let (e, s) = unknown("Foo", 10);
        diags.error(FileId::new(1), e.clone(), s);
        diags.error(FileId::new(0), e.clone(), s);
        diags.error(FileId::new(1), e, s);
        let (e2, s2) = unknown("Bar", 2);
        diags.error(FileId::new(1), e2, s2);

        let sorted = diags.into_sorted();
        let order: Vec<_> = sorted.iter().map(|e| (e.file.index(), e.span.start)).collect();
        assert_eq!(order, vec![(0, 10), (1, 2), (1, 10)]);
    }
}
