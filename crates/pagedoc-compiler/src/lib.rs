//! Documentation page compiler.
//!
//! Compiles validated page descriptions into render trees:
//!
//! - [`example`]: resolves codeblock tabs to code text (inline or from files)
//! - [`render`]: turns each section into a [`RenderNode`]
//! - [`anchors`]: maps `(page id, anchor)` to link paths
//! - [`page`]: compiles one page, staging its anchors
//! - [`links`]: checks every internal link against the registry
//! - [`build`]: compiles a page set in parallel and commits anchors in order
//!
//! # Example
//!
//! ```
//! use pagedoc_compiler::{Builder, PageInput, RenderNode};
//!
//! let page = PageInput::from_yaml_str(
//!     r#"
//! id: guide-webhooks
//! title: Subscribing to webhooks
//! sections:
//!   - type: Generic
//!     anchorLink: config
//!     title: Configure
//!     sectionContent: Declare topics in `shopify.app.toml`.
//!     codeblock:
//!       title: shopify.app.toml
//!       tabs:
//!         - title: shopify.app.toml
//!           language: toml
//!           code: |
//!             [webhooks]
//!             api_version = "2024-07"
//!   - type: Resource
//!     anchorLink: resources
//!     title: Resources
//!     resources:
//!       - name: Configuration
//!         url: /docs/guide-webhooks#config
//! "#,
//!     ".",
//! )
//! .unwrap();
//!
//! let report = Builder::default().build(&[page]).unwrap();
//! assert!(report.is_clean());
//!
//! let page = report.page("guide-webhooks").unwrap();
//! assert_eq!(page.sections.len(), 2);
//! assert!(matches!(page.sections[1], RenderNode::Resource { .. }));
//! ```

pub mod anchors;
pub mod build;
mod error;
pub mod example;
pub mod links;
pub mod page;
pub mod render;

pub use anchors::{AnchorRegistry, PageAnchors, RegistryError};
pub use build::{BuildError, BuildReport, Builder};
pub use error::{PageError, PageErrorKind};
pub use example::{ExampleError, ExampleResolver, ResolvedCode};
pub use links::{
    BrokenLink, BrokenLinkReason, LinkKind, LinkValidator, classify, is_well_formed_external,
};
pub use page::{
    CompileOptions, CompiledPage, PageCompiler, PageContext, PageInput, PageLink, TocEntry,
    compile_page,
};
pub use render::{
    CodeTab, CodeblockNode, RenderError, RenderNode, ResourceLink, SectionLink, render_section,
};

pub use pagedoc_config::AnchorPolicy;

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(CompiledPage: Send, Sync);
    static_assertions::assert_impl_all!(AnchorRegistry: Send, Sync);
    static_assertions::assert_impl_all!(Builder: Send, Sync);
    static_assertions::assert_impl_all!(PageError: Send, Sync, std::error::Error);
}
