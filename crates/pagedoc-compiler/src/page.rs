//! Page compilation.
//!
//! A page is validated, each section rendered in declared order, and its
//! anchors staged. Any failure aborts the page; nothing is registered until
//! the build commits the compiled page.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use pagedoc_config::{AnchorPolicy, Config, DocsConfig};
use pagedoc_markup::{Block, escape_html, parse, to_html};
use pagedoc_schema::{InputError, PageSchema};
use serde_json::Value;

use crate::anchors::{PageAnchors, normalize_route};
use crate::error::{PageError, PageErrorKind};
use crate::example::ExampleResolver;
use crate::render::{RenderNode, render_section};

/// Label for pages whose id cannot be read.
const UNNAMED_PAGE: &str = "(unnamed page)";

/// Settings shared by every page of a build.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Route prefix for pages without an explicit route.
    pub docs: DocsConfig,
    pub duplicate_anchors: AnchorPolicy,
    /// Allowed tab languages. `None` accepts any.
    pub languages: Option<Vec<String>>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            docs: DocsConfig::default(),
            duplicate_anchors: AnchorPolicy::Reject,
            languages: None,
        }
    }
}

impl From<&Config> for CompileOptions {
    fn from(config: &Config) -> Self {
        Self {
            docs: config.docs_resolved.clone(),
            duplicate_anchors: config.build.duplicate_anchors,
            languages: config.build.languages.clone(),
        }
    }
}

/// Where a page lives: its source directory and, optionally, a fixed route.
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    /// Directory file references are resolved against.
    pub base_dir: PathBuf,
    /// Route override. Defaults to `{route_prefix}/{id}`.
    pub route: Option<String>,
}

/// One raw page description handed to a build.
#[derive(Clone, Debug)]
pub struct PageInput {
    pub raw: Value,
    pub context: PageContext,
}

impl PageInput {
    pub fn new(raw: Value, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw,
            context: PageContext {
                base_dir: base_dir.into(),
                route: None,
            },
        }
    }

    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.context.route = Some(route.into());
        self
    }

    /// Parse a JSON page description.
    pub fn from_json_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, InputError> {
        Ok(Self::new(pagedoc_schema::parse_json(text)?, base_dir))
    }

    /// Parse a YAML page description.
    pub fn from_yaml_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, InputError> {
        Ok(Self::new(pagedoc_schema::parse_yaml(text)?, base_dir))
    }
}

fn raw_label(raw: &Value) -> &str {
    raw.get("id").and_then(Value::as_str).unwrap_or(UNNAMED_PAGE)
}

/// A link found on a compiled page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    /// Section the link belongs to; `None` for the page description.
    pub section_index: Option<usize>,
    /// Field path, e.g. `sections[2].resources[0].url`.
    pub field: String,
    pub target: String,
}

/// Table of contents entry, one per section.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TocEntry {
    pub title: String,
    pub anchor: String,
}

/// A fully compiled page.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CompiledPage {
    pub id: String,
    pub title: String,
    pub description: Vec<Block>,
    pub route: String,
    /// One node per section, in declared order.
    pub sections: Vec<RenderNode>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) anchors: PageAnchors,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub links: Vec<PageLink>,
}

impl CompiledPage {
    /// Anchors this page registers, in declaration order.
    pub fn anchors(&self) -> &[String] {
        self.anchors.anchors()
    }

    /// Sections as table of contents entries.
    pub fn toc(&self) -> Vec<TocEntry> {
        self.sections
            .iter()
            .map(|node| TocEntry {
                title: node.title().to_owned(),
                anchor: node.anchor().to_owned(),
            })
            .collect()
    }

    /// Render the page as an HTML `<article>`.
    ///
    /// A section only carries its anchor as element id if it owns it.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(2048);
        write!(out, "<article><h1>{}</h1>", escape_html(&self.title)).unwrap();
        out.push_str(&to_html(&self.description));
        for (index, node) in self.sections.iter().enumerate() {
            let owns_anchor = self.anchors.owner(node.anchor()) == Some(index);
            out.push_str(&node.to_html(owns_anchor));
        }
        out.push_str("</article>");
        out
    }
}

/// Compiles single pages.
#[derive(Clone, Debug, Default)]
pub struct PageCompiler {
    options: CompileOptions,
}

impl PageCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Validate and compile a raw page description.
    pub fn compile_raw(
        &self,
        raw: &Value,
        context: &PageContext,
    ) -> Result<CompiledPage, PageError> {
        let page = pagedoc_schema::validate(raw)
            .map_err(|err| PageError::from_schema(raw_label(raw), err))?;
        self.compile(&page, context)
    }

    pub fn compile_input(&self, input: &PageInput) -> Result<CompiledPage, PageError> {
        self.compile_raw(&input.raw, &input.context)
    }

    /// Compile a validated page.
    ///
    /// # Errors
    ///
    /// Fails on the first section whose code cannot be resolved and, under
    /// [`AnchorPolicy::Reject`], on the first reused anchor.
    pub fn compile(
        &self,
        page: &PageSchema,
        context: &PageContext,
    ) -> Result<CompiledPage, PageError> {
        let route = match &context.route {
            Some(route) => normalize_route(route).to_owned(),
            None => self.options.docs.default_route(&page.id),
        };
        let resolver = ExampleResolver::new(&context.base_dir)
            .with_languages(self.options.languages.as_deref());

        let description = parse(&page.description);
        let mut links: Vec<PageLink> = pagedoc_markup::links(&description)
            .into_iter()
            .map(|link| PageLink {
                section_index: None,
                field: "description".to_owned(),
                target: link.target.to_owned(),
            })
            .collect();

        let mut anchors = PageAnchors::new(page.id.as_str());
        let mut sections = Vec::with_capacity(page.sections.len());

        for (index, section) in page.sections.iter().enumerate() {
            let node = render_section(section, &resolver).map_err(|err| {
                PageError::new(page.id.as_str(), PageErrorKind::Example(err.source))
                    .in_section(index)
                    .at(format!("sections[{index}].{}", err.field))
            })?;

            if let Err(first_section) = anchors.stage(node.anchor(), index) {
                match self.options.duplicate_anchors {
                    AnchorPolicy::Reject => {
                        return Err(PageError::new(
                            page.id.as_str(),
                            PageErrorKind::DuplicateAnchor {
                                anchor: node.anchor().to_owned(),
                                first_section,
                            },
                        )
                        .in_section(index)
                        .at(format!("sections[{index}].anchorLink")));
                    }
                    AnchorPolicy::FirstWins => {
                        tracing::warn!(
                            page = %page.id,
                            anchor = node.anchor(),
                            section = index,
                            first_section,
                            "Duplicate anchor, keeping the first section"
                        );
                    }
                }
            }

            links.extend(node.links().into_iter().map(|link| PageLink {
                section_index: Some(index),
                field: format!("sections[{index}].{}", link.field),
                target: link.target,
            }));
            sections.push(node);
        }

        tracing::debug!(
            page = %page.id,
            route = %route,
            sections = sections.len(),
            links = links.len(),
            "Compiled page"
        );

        Ok(CompiledPage {
            id: page.id.clone(),
            title: page.title.clone(),
            description,
            route,
            sections,
            anchors,
            links,
        })
    }
}

/// Compile one page that lives in `base_dir` with default options.
///
/// ```
/// use pagedoc_compiler::compile_page;
///
/// let raw = serde_json::json!({
///     "id": "intro",
///     "title": "Intro",
///     "sections": [{"type": "Generic", "anchorLink": "start", "title": "Start", "sectionContent": "Hello"}]
/// });
/// let page = compile_page(&raw, ".").unwrap();
/// assert_eq!(page.route, "/docs/intro");
/// assert_eq!(page.anchors(), ["start"]);
/// ```
pub fn compile_page(raw: &Value, base_dir: impl AsRef<Path>) -> Result<CompiledPage, PageError> {
    let input = PageInput::new(raw.clone(), base_dir.as_ref());
    PageCompiler::default().compile_input(&input)
}
