//! Semantic HTML emission for block trees.

use std::fmt::Write;

use crate::node::{Block, Inline};

/// Render blocks to HTML.
pub fn to_html(blocks: &[Block]) -> String {
    let mut out = String::with_capacity(256);
    for block in blocks {
        block_to_html(block, &mut out);
    }
    out
}

/// Render inline nodes to HTML, appending to `out`.
pub fn inlines_to_html(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { text } => out.push_str(&escape_html(text)),
            Inline::Code { text } => write!(out, "<code>{}</code>", escape_html(text)).unwrap(),
            Inline::Emphasis { children } => wrap("em", children, out),
            Inline::Strong { children } => wrap("strong", children, out),
            Inline::Strikethrough { children } => wrap("s", children, out),
            Inline::Link { target, children } => {
                write!(out, r#"<a href="{}">"#, escape_html(target)).unwrap();
                inlines_to_html(children, out);
                out.push_str("</a>");
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("<br>"),
        }
    }
}

fn wrap(tag: &str, children: &[Inline], out: &mut String) {
    write!(out, "<{tag}>").unwrap();
    inlines_to_html(children, out);
    write!(out, "</{tag}>").unwrap();
}

fn block_to_html(block: &Block, out: &mut String) {
    match block {
        Block::Paragraph { content } => {
            out.push_str("<p>");
            inlines_to_html(content, out);
            out.push_str("</p>");
        }
        Block::Heading { level, content } => {
            write!(out, "<h{level}>").unwrap();
            inlines_to_html(content, out);
            write!(out, "</h{level}>").unwrap();
        }
        Block::List {
            ordered,
            start,
            items,
        } => {
            match (ordered, start) {
                (true, Some(n)) if *n != 1 => write!(out, r#"<ol start="{n}">"#).unwrap(),
                (true, _) => out.push_str("<ol>"),
                (false, _) => out.push_str("<ul>"),
            }
            for item in items {
                out.push_str("<li>");
                // Single-paragraph items render tight, without <p>
                if let [Block::Paragraph { content }] = item.as_slice() {
                    inlines_to_html(content, out);
                } else {
                    for child in item {
                        block_to_html(child, out);
                    }
                }
                out.push_str("</li>");
            }
            out.push_str(if *ordered { "</ol>" } else { "</ul>" });
        }
        Block::Quote { children } => {
            out.push_str("<blockquote>");
            for child in children {
                block_to_html(child, out);
            }
            out.push_str("</blockquote>");
        }
        Block::Admonition { kind, children } => {
            write!(
                out,
                r#"<div class="admonition admonition-{}"><p class="admonition-title">{}</p>"#,
                kind.class(),
                kind.label()
            )
            .unwrap();
            for child in children {
                block_to_html(child, out);
            }
            out.push_str("</div>");
        }
        Block::Code { language, text } => code_to_html(language.as_deref(), text, out),
        Block::Rule => out.push_str("<hr>"),
    }
}

fn code_to_html(language: Option<&str>, text: &str, out: &mut String) {
    if let Some(lang) = language {
        write!(
            out,
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(text)
        )
        .unwrap();
    } else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(text)).unwrap();
    }
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
