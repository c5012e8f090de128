//! Rich-text node tree for pagedoc section content.
//!
//! Section content and page descriptions use a small markdown dialect:
//! inline code, emphasis, links, ordered and unordered lists, and
//! blockquote admonitions (`> Note: ...`, `> Caution: ...`, or GFM
//! `> [!NOTE]`). [`parse`] turns such text into an explicit [`Block`] tree so
//! that link extraction ([`links`]) is a query over nodes rather than a
//! second scan of the source text.
//!
//! # Example
//!
//! ```
//! use pagedoc_markup::{AdmonitionKind, Block, links, parse, to_html};
//!
//! let blocks = parse("See [webhooks](/docs/apps/webhooks#config).\n\n> Caution: respond with `200`.");
//!
//! let targets: Vec<_> = links(&blocks).iter().map(|l| l.target).collect();
//! assert_eq!(targets, ["/docs/apps/webhooks#config"]);
//! assert!(matches!(blocks[1], Block::Admonition { kind: AdmonitionKind::Caution, .. }));
//! assert!(to_html(&blocks).contains(r#"<a href="/docs/apps/webhooks#config">webhooks</a>"#));
//! ```

mod html;
mod node;
mod parse;

pub use html::{escape_html, inlines_to_html, to_html};
pub use node::{AdmonitionKind, Block, Inline, LinkRef, links, plain_text};
pub use parse::parse;
