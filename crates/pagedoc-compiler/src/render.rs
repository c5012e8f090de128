//! Section rendering.
//!
//! Turns one validated [`Section`] into a [`RenderNode`]. Dispatch is a
//! closed match over the section kinds; adding a kind means adding a variant
//! here and in the schema, and the compiler points at every missing arm.

use std::fmt::Write;
use std::path::PathBuf;

use pagedoc_markup::{Block, escape_html, parse, to_html};
use pagedoc_schema::{Codeblock, GenericSection, ResourceSection, Section};

use crate::example::{ExampleError, ExampleResolver};

/// Output-ready representation of one section.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum RenderNode {
    Generic {
        anchor: String,
        title: String,
        /// Parsed `sectionContent`; empty when the section has none.
        content: Vec<Block>,
        codeblock: Option<CodeblockNode>,
    },
    Resource {
        anchor: String,
        title: String,
        links: Vec<ResourceLink>,
    },
}

/// A codeblock with every tab's code resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CodeblockNode {
    pub title: String,
    pub tabs: Vec<CodeTab>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CodeTab {
    pub title: String,
    pub language: String,
    /// Code text, verbatim.
    pub code: String,
    /// Example file the code came from.
    pub source: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceLink {
    pub name: String,
    pub url: String,
}

/// A link target found in a rendered section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionLink {
    /// Field within the section, e.g. `sectionContent` or `resources[1].url`.
    pub field: String,
    pub target: String,
}

/// Example resolution failure inside a section.
#[derive(Debug, thiserror::Error)]
#[error("{field}: {source}")]
pub struct RenderError {
    /// Field within the section, e.g. `codeblock.tabs[0].code`.
    pub field: String,
    #[source]
    pub source: ExampleError,
}

impl RenderNode {
    pub fn anchor(&self) -> &str {
        match self {
            Self::Generic { anchor, .. } | Self::Resource { anchor, .. } => anchor,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Generic { title, .. } | Self::Resource { title, .. } => title,
        }
    }

    /// Link targets in document order.
    pub fn links(&self) -> Vec<SectionLink> {
        match self {
            Self::Generic { content, .. } => pagedoc_markup::links(content)
                .into_iter()
                .map(|link| SectionLink {
                    field: "sectionContent".to_owned(),
                    target: link.target.to_owned(),
                })
                .collect(),
            Self::Resource { links, .. } => links
                .iter()
                .enumerate()
                .map(|(i, link)| SectionLink {
                    field: format!("resources[{i}].url"),
                    target: link.url.clone(),
                })
                .collect(),
        }
    }

    /// Render as an HTML `<section>`.
    ///
    /// `with_id` controls whether the anchor is emitted as the element id.
    pub fn to_html(&self, with_id: bool) -> String {
        let mut out = String::with_capacity(512);
        if with_id {
            write!(out, r#"<section id="{}">"#, escape_html(self.anchor())).unwrap();
        } else {
            out.push_str("<section>");
        }
        write!(out, "<h2>{}</h2>", escape_html(self.title())).unwrap();

        match self {
            Self::Generic {
                content, codeblock, ..
            } => {
                out.push_str(&to_html(content));
                if let Some(codeblock) = codeblock {
                    codeblock_to_html(codeblock, &mut out);
                }
            }
            Self::Resource { links, .. } => {
                out.push_str(r#"<ul class="resources">"#);
                for link in links {
                    write!(
                        out,
                        r#"<li><a href="{}">{}</a></li>"#,
                        escape_html(&link.url),
                        escape_html(&link.name)
                    )
                    .unwrap();
                }
                out.push_str("</ul>");
            }
        }

        out.push_str("</section>");
        out
    }
}

fn codeblock_to_html(codeblock: &CodeblockNode, out: &mut String) {
    write!(
        out,
        r#"<div class="codeblock"><p class="codeblock-title">{}</p>"#,
        escape_html(&codeblock.title)
    )
    .unwrap();
    for tab in &codeblock.tabs {
        write!(
            out,
            r#"<figure class="codeblock-tab"><figcaption>{}</figcaption><pre><code class="language-{}">{}</code></pre></figure>"#,
            escape_html(&tab.title),
            escape_html(&tab.language),
            escape_html(&tab.code)
        )
        .unwrap();
    }
    out.push_str("</div>");
}

/// Render one section.
///
/// # Errors
///
/// Returns the first tab whose code cannot be resolved; the whole codeblock
/// fails with it.
pub fn render_section(
    section: &Section,
    resolver: &ExampleResolver<'_>,
) -> Result<RenderNode, RenderError> {
    match section {
        Section::Generic(generic) => render_generic(generic, resolver),
        Section::Resource(resource) => Ok(render_resource(resource)),
    }
}

fn render_generic(
    section: &GenericSection,
    resolver: &ExampleResolver<'_>,
) -> Result<RenderNode, RenderError> {
    let content = section.content.as_deref().map(parse).unwrap_or_default();
    let codeblock = section
        .codeblock
        .as_ref()
        .map(|codeblock| render_codeblock(codeblock, resolver))
        .transpose()?;

    Ok(RenderNode::Generic {
        anchor: section.anchor.clone(),
        title: section.title.clone(),
        content,
        codeblock,
    })
}

fn render_codeblock(
    codeblock: &Codeblock,
    resolver: &ExampleResolver<'_>,
) -> Result<CodeblockNode, RenderError> {
    let mut tabs = Vec::with_capacity(codeblock.tabs.len());
    for (i, tab) in codeblock.tabs.iter().enumerate() {
        let resolved = resolver.resolve(tab).map_err(|source| RenderError {
            field: format!("codeblock.tabs[{i}].code"),
            source,
        })?;
        tabs.push(CodeTab {
            title: tab.title.clone(),
            language: resolved.language,
            code: resolved.text,
            source: resolved.source,
        });
    }
    Ok(CodeblockNode {
        title: codeblock.title.clone(),
        tabs,
    })
}

fn render_resource(section: &ResourceSection) -> RenderNode {
    RenderNode::Resource {
        anchor: section.anchor.clone(),
        title: section.title.clone(),
        links: section
            .resources
            .iter()
            .map(|resource| ResourceLink {
                name: resource.name.clone(),
                url: resource.url.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pagedoc_markup::{AdmonitionKind, Inline};
    use pagedoc_schema::{CodeRef, Resource, Tab};
    use pretty_assertions::assert_eq;

    use super::*;

    fn generic(content: Option<&str>, codeblock: Option<Codeblock>) -> Section {
        Section::Generic(GenericSection {
            anchor: "config".to_owned(),
            title: "Configure".to_owned(),
            content: content.map(str::to_owned),
            codeblock,
        })
    }

    fn inline_tab(title: &str, code: &str) -> Tab {
        Tab {
            title: title.to_owned(),
            code: CodeRef::Inline(code.to_owned()),
            language: "tsx".to_owned(),
        }
    }

    #[test]
    fn test_generic_content_parsed() {
        let resolver = ExampleResolver::new(Path::new("."));
        let node = render_section(
            &generic(Some("> Note: Use [webhooks](/docs/webhooks)."), None),
            &resolver,
        )
        .unwrap();

        let RenderNode::Generic {
            content, codeblock, ..
        } = &node
        else {
            panic!("expected generic node");
        };
        assert!(codeblock.is_none());
        assert!(matches!(
            content.as_slice(),
            [Block::Admonition {
                kind: AdmonitionKind::Note,
                ..
            }]
        ));
        assert_eq!(
            node.links(),
            vec![SectionLink {
                field: "sectionContent".to_owned(),
                target: "/docs/webhooks".to_owned(),
            }]
        );
    }

    #[test]
    fn test_inline_tabs_in_order() {
        let resolver = ExampleResolver::new(Path::new("."));
        let codeblock = Codeblock {
            title: "Handlers".to_owned(),
            tabs: vec![inline_tab("a.tsx", "let a;\n"), inline_tab("b.tsx", "let b;")],
        };
        let node = render_section(&generic(None, Some(codeblock)), &resolver).unwrap();

        let RenderNode::Generic {
            content,
            codeblock: Some(codeblock),
            ..
        } = node
        else {
            panic!("expected generic node with codeblock");
        };
        assert!(content.is_empty());
        let codes: Vec<_> = codeblock.tabs.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["let a;\n", "let b;"]);
    }

    #[test]
    fn test_missing_tab_fails_whole_codeblock() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.ts"), "ok").unwrap();
        let resolver = ExampleResolver::new(dir.path());
        let codeblock = Codeblock {
            title: "Files".to_owned(),
            tabs: vec![
                Tab {
                    title: "ok.ts".to_owned(),
                    code: CodeRef::File("./ok.ts".into()),
                    language: "ts".to_owned(),
                },
                Tab {
                    title: "gone.ts".to_owned(),
                    code: CodeRef::File("./gone.ts".into()),
                    language: "ts".to_owned(),
                },
            ],
        };

        let err = render_section(&generic(None, Some(codeblock)), &resolver).unwrap_err();
        assert_eq!(err.field, "codeblock.tabs[1].code");
        assert!(matches!(err.source, ExampleError::Missing { ref path, .. } if path == Path::new("./gone.ts")));
    }

    #[test]
    fn test_resource_links() {
        let section = Section::Resource(ResourceSection {
            anchor: "resources".to_owned(),
            title: "Resources".to_owned(),
            resources: vec![
                Resource {
                    name: "authenticate.webhook".to_owned(),
                    url: "/docs/api/authenticate/webhook".to_owned(),
                },
                Resource {
                    name: "Topics".to_owned(),
                    url: "https://example.com/topics".to_owned(),
                },
            ],
        });
        let node = render_section(&section, &ExampleResolver::new(Path::new("."))).unwrap();

        let fields: Vec<_> = node.links().into_iter().map(|l| l.field).collect();
        assert_eq!(fields, vec!["resources[0].url", "resources[1].url"]);
        assert_eq!(node.anchor(), "resources");
    }

    #[test]
    fn test_section_html() {
        let node = RenderNode::Generic {
            anchor: "config".to_owned(),
            title: "Config & setup".to_owned(),
            content: vec![Block::Paragraph {
                content: vec![Inline::Text {
                    text: "Hi".to_owned(),
                }],
            }],
            codeblock: Some(CodeblockNode {
                title: "Example".to_owned(),
                tabs: vec![CodeTab {
                    title: "a.ts".to_owned(),
                    language: "ts".to_owned(),
                    code: "a < b".to_owned(),
                    source: None,
                }],
            }),
        };

        assert_eq!(
            node.to_html(true),
            concat!(
                r#"<section id="config"><h2>Config &amp; setup</h2><p>Hi</p>"#,
                r#"<div class="codeblock"><p class="codeblock-title">Example</p>"#,
                r#"<figure class="codeblock-tab"><figcaption>a.ts</figcaption>"#,
                r#"<pre><code class="language-ts">a &lt; b</code></pre></figure></div></section>"#,
            )
        );
        assert!(node.to_html(false).starts_with("<section><h2>"));
    }
}
