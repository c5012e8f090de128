//! pulldown-cmark event stream to [`Block`] tree.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::node::{AdmonitionKind, Block, Inline};

/// `Note:` style label at the start of a blockquote.
static ADMONITION_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(note|info|tip|important|warning|caution)\s*:\s*").unwrap()
});

/// Parse rich text into a block tree.
///
/// Raw HTML is kept as literal text. Images are reduced to their alt text.
pub fn parse(text: &str) -> Vec<Block> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_GFM;
    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(text, options) {
        builder.event(event);
    }
    builder.finish()
}

/// Open container while walking events.
enum Frame {
    Paragraph(Vec<Inline>),
    Heading(u8, Vec<Inline>),
    Quote(Option<AdmonitionKind>, Vec<Block>),
    List {
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    /// Tight list items carry inline content without a paragraph.
    Item {
        blocks: Vec<Block>,
        inlines: Vec<Inline>,
    },
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link(String, Vec<Inline>),
    Image(String),
    Code(Option<String>, String),
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Block>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(Inline::Code {
                text: code.into_string(),
            }),
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(Block::Rule),
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph(Vec::new()),
            Tag::Heading { level, .. } => Frame::Heading(level as u8, Vec::new()),
            Tag::BlockQuote(kind) => Frame::Quote(kind.map(AdmonitionKind::from), Vec::new()),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                Frame::Code(language, String::new())
            }
            Tag::List(start) => Frame::List {
                start,
                items: Vec::new(),
            },
            Tag::Item => Frame::Item {
                blocks: Vec::new(),
                inlines: Vec::new(),
            },
            Tag::Emphasis => Frame::Emphasis(Vec::new()),
            Tag::Strong => Frame::Strong(Vec::new()),
            Tag::Strikethrough => Frame::Strikethrough(Vec::new()),
            Tag::Link { dest_url, .. } => Frame::Link(dest_url.into_string(), Vec::new()),
            Tag::Image { .. } => Frame::Image(String::new()),
            // Not enabled or passed through as content
            _ => return,
        };
        self.stack.push(frame);
    }

    fn end(&mut self, tag: TagEnd) {
        let tracked = matches!(
            tag,
            TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::BlockQuote(_)
                | TagEnd::CodeBlock
                | TagEnd::List(_)
                | TagEnd::Item
                | TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image
        );
        if !tracked {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph(content) => self.push_block(Block::Paragraph { content }),
            Frame::Heading(level, content) => self.push_block(Block::Heading { level, content }),
            Frame::Quote(kind, mut children) => {
                let kind = kind.or_else(|| take_admonition_label(&mut children));
                let block = match kind {
                    Some(kind) => Block::Admonition { kind, children },
                    None => Block::Quote { children },
                };
                self.push_block(block);
            }
            Frame::Code(language, text) => self.push_block(Block::Code { language, text }),
            Frame::List { start, items } => self.push_block(Block::List {
                ordered: start.is_some(),
                start,
                items,
            }),
            Frame::Item {
                mut blocks,
                inlines,
            } => {
                if !inlines.is_empty() {
                    blocks.push(Block::Paragraph { content: inlines });
                }
                if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                    items.push(blocks);
                }
            }
            Frame::Emphasis(children) => self.push_inline(Inline::Emphasis { children }),
            Frame::Strong(children) => self.push_inline(Inline::Strong { children }),
            Frame::Strikethrough(children) => {
                self.push_inline(Inline::Strikethrough { children });
            }
            Frame::Link(target, children) => self.push_inline(Inline::Link { target, children }),
            Frame::Image(alt) => self.push_inline(Inline::Text { text: alt }),
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Code(_, code)) => code.push_str(text),
            Some(Frame::Image(alt)) => alt.push_str(text),
            _ => self.push_inline(Inline::Text {
                text: text.to_owned(),
            }),
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.stack.last_mut() {
            Some(
                Frame::Paragraph(content)
                | Frame::Heading(_, content)
                | Frame::Emphasis(content)
                | Frame::Strong(content)
                | Frame::Strikethrough(content)
                | Frame::Link(_, content)
                | Frame::Item {
                    inlines: content, ..
                },
            ) => push_merged(content, inline),
            Some(Frame::Image(alt)) => alt.push_str(&crate::node::plain_text(&[inline])),
            _ => self.push_block(Block::Paragraph {
                content: vec![inline],
            }),
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Quote(_, children)) => children.push(block),
            Some(Frame::Item { blocks, inlines }) => {
                if !inlines.is_empty() {
                    blocks.push(Block::Paragraph {
                        content: std::mem::take(inlines),
                    });
                }
                blocks.push(block);
            }
            _ => self.root.push(block),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        // Well-formed event streams leave nothing open; close leftovers anyway.
        while !self.stack.is_empty() {
            self.end(TagEnd::Paragraph);
        }
        self.root
    }
}

/// Append an inline, joining adjacent text runs that the parser split.
fn push_merged(content: &mut Vec<Inline>, inline: Inline) {
    if let (Some(Inline::Text { text: last }), Inline::Text { text }) =
        (content.last_mut(), &inline)
    {
        last.push_str(text);
        return;
    }
    content.push(inline);
}

/// Detect and strip a `Note:` / `**Note:**` label from a plain blockquote.
fn take_admonition_label(children: &mut Vec<Block>) -> Option<AdmonitionKind> {
    let Some(Block::Paragraph { content }) = children.first_mut() else {
        return None;
    };

    let kind = match content.first_mut()? {
        Inline::Text { text } => strip_label(text)?,
        Inline::Strong { children: strong } => {
            let [Inline::Text { text }] = strong.as_mut_slice() else {
                return None;
            };
            let kind = strip_label(text)?;
            if text.is_empty() {
                content.remove(0);
            } else {
                let rest = std::mem::take(text);
                content[0] = Inline::Text { text: rest };
            }
            trim_leading(content);
            drop_empty_first_paragraph(children);
            return Some(kind);
        }
        _ => return None,
    };

    if matches!(content.first(), Some(Inline::Text { text }) if text.is_empty()) {
        content.remove(0);
    }
    trim_leading(content);
    drop_empty_first_paragraph(children);
    Some(kind)
}

/// Remove a recognized label prefix from `text`, returning its kind.
fn strip_label(text: &mut String) -> Option<AdmonitionKind> {
    let captures = ADMONITION_LABEL_RE.captures(text)?;
    let kind = AdmonitionKind::from_label(&captures[1])?;
    let end = captures.get(0)?.end();
    text.drain(..end);
    Some(kind)
}

/// Drop leading whitespace text and line breaks left behind by a label.
fn trim_leading(content: &mut Vec<Inline>) {
    while let Some(first) = content.first_mut() {
        match first {
            Inline::SoftBreak | Inline::HardBreak => {
                content.remove(0);
            }
            Inline::Text { text } => {
                let trimmed = text.trim_start().len();
                if trimmed == 0 {
                    content.remove(0);
                } else {
                    let cut = text.len() - trimmed;
                    text.drain(..cut);
                    return;
                }
            }
            _ => return,
        }
    }
}

fn drop_empty_first_paragraph(children: &mut Vec<Block>) {
    if matches!(children.first(), Some(Block::Paragraph { content }) if content.is_empty()) {
        children.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text { text: s.to_owned() }
    }

    fn code(s: &str) -> Inline {
        Inline::Code { text: s.to_owned() }
    }

    #[test]
    fn test_paragraph_with_inline_code_and_link() {
        let blocks = parse("Use `shopify.app.toml`. See [docs](/docs/apps/webhooks).");
        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                content: vec![
                    text("Use "),
                    code("shopify.app.toml"),
                    text(". See "),
                    Inline::Link {
                        target: "/docs/apps/webhooks".to_owned(),
                        children: vec![text("docs")],
                    },
                    text("."),
                ],
            }]
        );
    }

    #[test]
    fn test_ordered_list_interrupts_paragraph() {
        let blocks = parse("Follow these steps:\n1. Add the topic.\n1. Run `deploy`.");
        assert_eq!(blocks.len(), 2);
        let Block::List {
            ordered,
            start,
            items,
        } = &blocks[1]
        else {
            panic!("expected list, got {:?}", blocks[1]);
        };
        assert!(ordered);
        assert_eq!(*start, Some(1));
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            vec![Block::Paragraph {
                content: vec![text("Run "), code("deploy"), text(".")],
            }]
        );
    }

    #[test]
    fn test_unordered_list() {
        let blocks = parse("- one\n- two");
        assert!(matches!(
            &blocks[0],
            Block::List { ordered: false, start: None, items } if items.len() == 2
        ));
    }

    #[test]
    fn test_note_admonition() {
        let blocks = parse("> Note: You can't register mandatory topics here.");
        assert_eq!(
            blocks,
            vec![Block::Admonition {
                kind: AdmonitionKind::Note,
                children: vec![Block::Paragraph {
                    content: vec![text("You can't register mandatory topics here.")],
                }],
            }]
        );
    }

    #[test]
    fn test_caution_admonition_keeps_strong() {
        let blocks = parse("> Caution: Endpoints **must** respond with `HTTP 200`.");
        let Block::Admonition { kind, children } = &blocks[0] else {
            panic!("expected admonition");
        };
        assert_eq!(*kind, AdmonitionKind::Caution);
        assert_eq!(
            children[0],
            Block::Paragraph {
                content: vec![
                    text("Endpoints "),
                    Inline::Strong {
                        children: vec![text("must")],
                    },
                    text(" respond with "),
                    code("HTTP 200"),
                    text("."),
                ],
            }
        );
    }

    #[test]
    fn test_bold_label_admonition() {
        let blocks = parse("> **Warning:** data loss");
        let Block::Admonition { kind, children } = &blocks[0] else {
            panic!("expected admonition");
        };
        assert_eq!(*kind, AdmonitionKind::Warning);
        assert_eq!(
            children[0],
            Block::Paragraph {
                content: vec![text("data loss")],
            }
        );
    }

    #[test]
    fn test_gfm_alert() {
        let blocks = parse("> [!TIP]\n> Use app-specific webhooks.");
        let Block::Admonition { kind, .. } = &blocks[0] else {
            panic!("expected admonition, got {blocks:?}");
        };
        assert_eq!(*kind, AdmonitionKind::Tip);
    }

    #[test]
    fn test_plain_quote() {
        let blocks = parse("> Just a quote.");
        assert!(matches!(blocks[0], Block::Quote { .. }));
    }

    #[test]
    fn test_label_only_line() {
        let blocks = parse("> Note:\n> Second line.");
        let Block::Admonition { children, .. } = &blocks[0] else {
            panic!("expected admonition");
        };
        assert_eq!(
            children[0],
            Block::Paragraph {
                content: vec![text("Second line.")],
            }
        );
    }

    #[test]
    fn test_fenced_code_in_content() {
        let blocks = parse("```toml\n[webhooks]\napi_version = \"2024-07\"\n```");
        assert_eq!(
            blocks,
            vec![Block::Code {
                language: Some("toml".to_owned()),
                text: "[webhooks]\napi_version = \"2024-07\"\n".to_owned(),
            }]
        );
    }

    #[test]
    fn test_emphasis_and_strikethrough() {
        let blocks = parse("*soft* and ~~gone~~");
        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                content: vec![
                    Inline::Emphasis {
                        children: vec![text("soft")],
                    },
                    text(" and "),
                    Inline::Strikethrough {
                        children: vec![text("gone")],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_image_becomes_alt_text() {
        let blocks = parse("![diagram of flow](/img/flow.png)");
        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                content: vec![text("diagram of flow")],
            }]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
    }
}
