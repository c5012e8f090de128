//! Rich-text node types and tree queries.

use pulldown_cmark::BlockQuoteKind;

/// Block-level node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum Block {
    Paragraph {
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    List {
        ordered: bool,
        /// First item number of an ordered list.
        start: Option<u64>,
        /// Each item is a sequence of blocks.
        items: Vec<Vec<Block>>,
    },
    /// Plain blockquote.
    Quote {
        children: Vec<Block>,
    },
    /// Blockquote tagged as a callout; the label is not part of `children`.
    Admonition {
        kind: AdmonitionKind,
        children: Vec<Block>,
    },
    /// Fenced or indented code inside rich text.
    Code {
        language: Option<String>,
        text: String,
    },
    Rule,
}

/// Inline node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum Inline {
    Text { text: String },
    Code { text: String },
    Emphasis { children: Vec<Inline> },
    Strong { children: Vec<Inline> },
    Strikethrough { children: Vec<Inline> },
    Link { target: String, children: Vec<Inline> },
    SoftBreak,
    HardBreak,
}

/// Callout flavor of an admonition block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum AdmonitionKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionKind {
    /// Match a written label such as `Note` or `caution`. `Info` is a note.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "note" | "info" => Some(Self::Note),
            "tip" => Some(Self::Tip),
            "important" => Some(Self::Important),
            "warning" => Some(Self::Warning),
            "caution" => Some(Self::Caution),
            _ => None,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }

    /// Lowercase name used in CSS classes.
    pub fn class(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }
}

impl From<BlockQuoteKind> for AdmonitionKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// A link found in a block tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRef<'a> {
    /// Link destination exactly as written.
    pub target: &'a str,
    /// Plain text of the link label.
    pub text: String,
}

/// All links in document order, including links nested in lists,
/// quotes, admonitions, and emphasis.
pub fn links(blocks: &[Block]) -> Vec<LinkRef<'_>> {
    let mut found = Vec::new();
    for block in blocks {
        collect_block_links(block, &mut found);
    }
    found
}

fn collect_block_links<'a>(block: &'a Block, found: &mut Vec<LinkRef<'a>>) {
    match block {
        Block::Paragraph { content } | Block::Heading { content, .. } => {
            collect_inline_links(content, found);
        }
        Block::List { items, .. } => {
            for child in items.iter().flatten() {
                collect_block_links(child, found);
            }
        }
        Block::Quote { children } | Block::Admonition { children, .. } => {
            for child in children {
                collect_block_links(child, found);
            }
        }
        Block::Code { .. } | Block::Rule => {}
    }
}

fn collect_inline_links<'a>(inlines: &'a [Inline], found: &mut Vec<LinkRef<'a>>) {
    for inline in inlines {
        match inline {
            Inline::Link { target, children } => {
                found.push(LinkRef {
                    target,
                    text: plain_text(children),
                });
                collect_inline_links(children, found);
            }
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Strikethrough { children } => collect_inline_links(children, found),
            Inline::Text { .. } | Inline::Code { .. } | Inline::SoftBreak | Inline::HardBreak => {}
        }
    }
}

/// Text content of inline nodes with formatting removed.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { text } | Inline::Code { text } => out.push_str(text),
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Strikethrough { children }
            | Inline::Link { children, .. } => push_plain_text(children, out),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
        }
    }
}
