//! Schema validation errors.

/// A page description that does not match the schema.
///
/// `path` names the offending field, e.g. `sections[2].resources[0].url`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {kind}")]
pub struct SchemaError {
    pub path: String,
    /// Index of the section the field belongs to, if any.
    pub section_index: Option<usize>,
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    pub(crate) fn new(path: impl Into<String>, kind: SchemaErrorKind) -> Self {
        Self {
            path: path.into(),
            section_index: None,
            kind,
        }
    }

    pub(crate) fn in_section(mut self, index: usize) -> Self {
        self.section_index = Some(index);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaErrorKind {
    #[error("missing required field")]
    Missing,
    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("must not be empty")]
    Empty,
    /// Section `type` tag is a string but not a known kind.
    #[error("unknown section kind `{0}`")]
    UnknownSectionKind(String),
    #[error("section needs `sectionContent` or `codeblock`")]
    NoContent,
    #[error("invalid anchor id `{0}` (no whitespace or `#` allowed)")]
    InvalidAnchor(String),
    #[error("invalid language identifier `{0}`")]
    InvalidLanguage(String),
    #[error("expected a code string or an object with `file` or `inline`")]
    InvalidCodeRef,
}

/// Page description text that could not be parsed at all.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
