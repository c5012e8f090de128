//! Validated page schema types.

use std::fmt;
use std::path::PathBuf;

/// A validated documentation page description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSchema {
    /// Stable identifier, unique across a compiled set.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Rich-text description shown under the title (may be empty).
    pub description: String,
    /// Sections in display order. Never empty.
    pub sections: Vec<Section>,
}

/// Section kind tag as written in the `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Text with an optional code block.
    Generic,
    /// List of named links.
    Resource,
}

impl SectionKind {
    /// Every recognized kind.
    pub const ALL: [Self; 2] = [Self::Generic, Self::Resource];

    /// Parse a `type` tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Tag as written in page descriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "Generic",
            Self::Resource => "Resource",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One titled block within a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Generic(GenericSection),
    Resource(ResourceSection),
}

impl Section {
    /// Anchor id, unique within the page.
    pub fn anchor(&self) -> &str {
        match self {
            Self::Generic(s) => &s.anchor,
            Self::Resource(s) => &s.anchor,
        }
    }

    /// Section heading.
    pub fn title(&self) -> &str {
        match self {
            Self::Generic(s) => &s.title,
            Self::Resource(s) => &s.title,
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Generic(_) => SectionKind::Generic,
            Self::Resource(_) => SectionKind::Resource,
        }
    }
}

/// Text section with an optional code sample.
///
/// At least one of `content` and `codeblock` is present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericSection {
    pub anchor: String,
    pub title: String,
    /// Markdown-like rich text (`sectionContent`).
    pub content: Option<String>,
    pub codeblock: Option<Codeblock>,
}

/// Section listing related documentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceSection {
    pub anchor: String,
    pub title: String,
    /// Never empty.
    pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub url: String,
}

/// A titled group of code tabs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Codeblock {
    pub title: String,
    /// Tabs in display order. Never empty.
    pub tabs: Vec<Tab>,
}

/// A single language-tagged code sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    /// Display label, usually a file name.
    pub title: String,
    pub code: CodeRef,
    /// Syntax highlighting grammar identifier.
    pub language: String,
}

/// Where a tab's code comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeRef {
    /// Code given literally in the page description.
    Inline(String),
    /// Path to an example file, relative to the page's source directory.
    File(PathBuf),
}

impl CodeRef {
    /// Classify a bare `code` string.
    ///
    /// A single-line value starting with `./` or `../` is a file reference;
    /// anything else is literal code. Trailing whitespace after a path is
    /// dropped.
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use pagedoc_schema::CodeRef;
    ///
    /// assert_eq!(
    ///     CodeRef::from_code_string("./examples/config.example.ts"),
    ///     CodeRef::File(PathBuf::from("./examples/config.example.ts"))
    /// );
    /// assert_eq!(
    ///     CodeRef::from_code_string("const x = 1;"),
    ///     CodeRef::Inline("const x = 1;".to_owned())
    /// );
    /// ```
    pub fn from_code_string(value: &str) -> Self {
        let is_path = !value.contains('\n')
            && (value.starts_with("./") || value.starts_with("../"))
            && !value.trim_end().contains(char::is_whitespace);
        if is_path {
            Self::File(PathBuf::from(value.trim_end()))
        } else {
            Self::Inline(value.to_owned())
        }
    }
}
