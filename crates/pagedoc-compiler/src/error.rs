//! Page-level compile errors.

use std::fmt;

use pagedoc_schema::{SchemaError, SchemaErrorKind};

use crate::anchors::RegistryError;
use crate::example::ExampleError;

/// A page that could not be compiled.
///
/// Identifies the page, the section (when the failure belongs to one) and
/// the field path within the page description.
#[derive(Debug, thiserror::Error)]
#[error("page `{page_id}`{}: {kind}", Location(.section_index.as_ref(), .field.as_deref()))]
pub struct PageError {
    pub page_id: String,
    pub section_index: Option<usize>,
    /// Field path, e.g. `sections[1].codeblock.tabs[0].code`.
    pub field: Option<String>,
    pub kind: PageErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum PageErrorKind {
    /// The description does not match the schema.
    #[error("{0}")]
    Schema(SchemaErrorKind),
    /// A section's `type` tag names no known section kind.
    #[error("unknown section kind `{0}`")]
    UnknownSectionKind(String),
    #[error(transparent)]
    Example(ExampleError),
    /// Two sections of the page share an anchor id.
    #[error("duplicate anchor `{anchor}` (already used by section {first_section})")]
    DuplicateAnchor { anchor: String, first_section: usize },
    /// The page clashes with an already committed page.
    #[error(transparent)]
    Registry(RegistryError),
}

impl PageError {
    pub fn new(page_id: impl Into<String>, kind: PageErrorKind) -> Self {
        Self {
            page_id: page_id.into(),
            section_index: None,
            field: None,
            kind,
        }
    }

    #[must_use]
    pub fn in_section(mut self, index: usize) -> Self {
        self.section_index = Some(index);
        self
    }

    #[must_use]
    pub fn at(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Wrap a schema validation failure.
    pub fn from_schema(page_id: impl Into<String>, err: SchemaError) -> Self {
        let kind = match err.kind {
            SchemaErrorKind::UnknownSectionKind(tag) => PageErrorKind::UnknownSectionKind(tag),
            other => PageErrorKind::Schema(other),
        };
        Self {
            page_id: page_id.into(),
            section_index: err.section_index,
            field: Some(err.path),
            kind,
        }
    }
}

pub(crate) struct Location<'a>(pub Option<&'a usize>, pub Option<&'a str>);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0, self.1) {
            (Some(index), Some(field)) => write!(f, ", section {index} ({field})"),
            (Some(index), None) => write!(f, ", section {index}"),
            (None, Some(field)) => write!(f, " ({field})"),
            (None, None) => Ok(()),
        }
    }
}
