//! Code example resolution for codeblock tabs.
//!
//! Inline code passes through unchanged. File references are read relative
//! to the page's source directory and embedded verbatim; the text is never
//! parsed, only tagged with the tab's language for highlighting downstream.

use std::io;
use std::path::{Path, PathBuf};

use pagedoc_schema::{CodeRef, Tab};

/// Code text ready for embedding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCode {
    pub text: String,
    pub language: String,
    /// File the text was read from, `None` for inline code.
    pub source: Option<PathBuf>,
}

/// Failure to produce a tab's code.
#[derive(Debug, thiserror::Error)]
pub enum ExampleError {
    /// The referenced file does not exist (or is not a file).
    #[error("code example not found: {} (resolved to {})", .path.display(), .resolved.display())]
    Missing {
        /// Path as written in the page description.
        path: PathBuf,
        resolved: PathBuf,
    },
    /// The referenced file has no non-whitespace content.
    #[error("code example is empty: {}", .path.display())]
    Empty { path: PathBuf },
    /// The file exists but could not be read.
    #[error("cannot read code example {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The language is not in the configured allow-list.
    #[error("language `{language}` is not in the configured language list")]
    UnknownLanguage { language: String },
}

/// Resolves tab code relative to one page's source directory.
#[derive(Clone, Copy, Debug)]
pub struct ExampleResolver<'a> {
    base_dir: &'a Path,
    languages: Option<&'a [String]>,
}

impl<'a> ExampleResolver<'a> {
    /// Create a resolver for a page whose description lives in `base_dir`.
    pub fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            languages: None,
        }
    }

    /// Restrict tab languages to `languages`.
    #[must_use]
    pub fn with_languages(mut self, languages: Option<&'a [String]>) -> Self {
        self.languages = languages;
        self
    }

    /// Produce the code for one tab.
    ///
    /// # Errors
    ///
    /// Returns `ExampleError::Missing` or `ExampleError::Empty` for bad file
    /// references, `ExampleError::Unreadable` for other I/O failures, and
    /// `ExampleError::UnknownLanguage` when an allow-list is set and does not
    /// contain the tab's language.
    pub fn resolve(&self, tab: &Tab) -> Result<ResolvedCode, ExampleError> {
        self.check_language(&tab.language)?;

        match &tab.code {
            CodeRef::Inline(text) => Ok(ResolvedCode {
                text: text.clone(),
                language: tab.language.clone(),
                source: None,
            }),
            CodeRef::File(path) => {
                let (text, resolved) = self.read(path)?;
                tracing::debug!(
                    path = %resolved.display(),
                    bytes = text.len(),
                    "Resolved code example"
                );
                Ok(ResolvedCode {
                    text,
                    language: tab.language.clone(),
                    source: Some(resolved),
                })
            }
        }
    }

    fn check_language(&self, language: &str) -> Result<(), ExampleError> {
        match self.languages {
            Some(allowed) if !allowed.iter().any(|l| l == language) => {
                Err(ExampleError::UnknownLanguage {
                    language: language.to_owned(),
                })
            }
            _ => Ok(()),
        }
    }

    fn read(&self, path: &Path) -> Result<(String, PathBuf), ExampleError> {
        let resolved = self.base_dir.join(path);
        if !resolved.is_file() {
            return Err(ExampleError::Missing {
                path: path.to_path_buf(),
                resolved,
            });
        }

        let text = std::fs::read_to_string(&resolved).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ExampleError::Missing {
                    path: path.to_path_buf(),
                    resolved: resolved.clone(),
                }
            } else {
                ExampleError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        if text.trim().is_empty() {
            return Err(ExampleError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok((text, resolved))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tab(code: CodeRef, language: &str) -> Tab {
        Tab {
            title: "example".to_owned(),
            code,
            language: language.to_owned(),
        }
    }

    #[test]
    fn test_inline_code_unchanged() {
        let code = "  export const action = async () => {};\n\n";
        let resolver = ExampleResolver::new(Path::new("/nonexistent"));
        let resolved = resolver
            .resolve(&tab(CodeRef::Inline(code.to_owned()), "tsx"))
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedCode {
                text: code.to_owned(),
                language: "tsx".to_owned(),
                source: None,
            }
        );
    }

    #[test]
    fn test_file_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("examples")).unwrap();
        std::fs::write(dir.path().join("examples/config.ts"), "const a = 1;\n").unwrap();

        let resolver = ExampleResolver::new(dir.path());
        let resolved = resolver
            .resolve(&tab(CodeRef::File("./examples/config.ts".into()), "ts"))
            .unwrap();

        assert_eq!(resolved.text, "const a = 1;\n");
        assert_eq!(resolved.language, "ts");
        assert_eq!(
            resolved.source,
            Some(dir.path().join("./examples/config.ts"))
        );
    }

    #[test]
    fn test_path_with_trailing_space_resolves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "export {};\n").unwrap();

        let resolver = ExampleResolver::new(dir.path());
        let resolved = resolver
            .resolve(&tab(CodeRef::from_code_string("./a.ts "), "ts"))
            .unwrap();
        assert_eq!(resolved.text, "export {};\n");
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ExampleResolver::new(dir.path());
        let err = resolver
            .resolve(&tab(CodeRef::File("./examples/missing.ts".into()), "ts"))
            .unwrap_err();

        let ExampleError::Missing { path, .. } = &err else {
            panic!("expected Missing, got {err:?}");
        };
        assert_eq!(path, Path::new("./examples/missing.ts"));
        assert!(err.to_string().contains("./examples/missing.ts"));
    }

    #[test]
    fn test_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("examples")).unwrap();
        let resolver = ExampleResolver::new(dir.path());
        let err = resolver
            .resolve(&tab(CodeRef::File("./examples".into()), "ts"))
            .unwrap_err();
        assert!(matches!(err, ExampleError::Missing { .. }));
    }

    #[test]
    fn test_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blank.ts"), " \n\t\n").unwrap();
        let resolver = ExampleResolver::new(dir.path());
        let err = resolver
            .resolve(&tab(CodeRef::File("./blank.ts".into()), "ts"))
            .unwrap_err();
        assert!(matches!(err, ExampleError::Empty { ref path } if path == Path::new("./blank.ts")));
    }

    #[test]
    fn test_language_allow_list() {
        let allowed = vec!["tsx".to_owned()];
        let resolver = ExampleResolver::new(Path::new(".")).with_languages(Some(&allowed));

        assert!(
            resolver
                .resolve(&tab(CodeRef::Inline("x".to_owned()), "tsx"))
                .is_ok()
        );
        let err = resolver
            .resolve(&tab(CodeRef::Inline("x".to_owned()), "cobol"))
            .unwrap_err();
        assert!(matches!(err, ExampleError::UnknownLanguage { ref language } if language == "cobol"));
    }
}
