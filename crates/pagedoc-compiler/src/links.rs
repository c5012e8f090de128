//! Link classification and validation.
//!
//! Internal links (`/path#anchor`) and same-page links (`#anchor`) are
//! checked against the anchor registry. External URLs are only checked for
//! syntax. Validation never fails a page; it reports every broken link.

use std::sync::LazyLock;

use glob::Pattern;
use regex::Regex;

use crate::anchors::AnchorRegistry;
use crate::error::Location;
use crate::page::{CompiledPage, PageLink};

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap());

/// `[userinfo@]host[:port][/path|?query|#fragment]` after `//`.
static AUTHORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^/?#@]+@)?[A-Za-z0-9](?:[A-Za-z0-9.-]*[A-Za-z0-9])?(?::\d+)?(?:[/?#].*)?$")
        .unwrap()
});

static MAILTO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// What a link target points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// Absolute path within the site, query stripped.
    Internal {
        path: &'a str,
        fragment: Option<&'a str>,
    },
    /// `#anchor` on the linking page.
    SamePage { fragment: &'a str },
    /// URL with a scheme, or protocol-relative.
    External,
    /// Not a usable link; the message says why.
    Malformed(&'static str),
}

/// Classify a link target.
///
/// ```
/// use pagedoc_compiler::{LinkKind, classify};
///
/// assert_eq!(
///     classify("/docs/api/webhook#payload"),
///     LinkKind::Internal { path: "/docs/api/webhook", fragment: Some("payload") }
/// );
/// assert_eq!(classify("#config"), LinkKind::SamePage { fragment: "config" });
/// assert_eq!(classify("https://shopify.dev"), LinkKind::External);
/// assert!(matches!(classify("guides/webhooks"), LinkKind::Malformed(_)));
/// ```
pub fn classify(target: &str) -> LinkKind<'_> {
    if target.is_empty() {
        return LinkKind::Malformed("empty link target");
    }
    if target.contains(char::is_whitespace) {
        return LinkKind::Malformed("link target contains whitespace");
    }

    if let Some(fragment) = target.strip_prefix('#') {
        return if fragment.is_empty() {
            LinkKind::Malformed("empty fragment")
        } else {
            LinkKind::SamePage { fragment }
        };
    }

    if target.starts_with("//") || SCHEME_RE.is_match(target) {
        return LinkKind::External;
    }

    if target.starts_with('/') {
        let (rest, fragment) = match target.split_once('#') {
            Some((_, "")) => return LinkKind::Malformed("empty fragment"),
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (target, None),
        };
        let path = rest.split_once('?').map_or(rest, |(path, _)| path);
        return LinkKind::Internal { path, fragment };
    }

    LinkKind::Malformed("relative link; use an absolute path or a full URL")
}

/// Syntax check for an external URL.
pub fn is_well_formed_external(target: &str) -> bool {
    if let Some(authority) = target.strip_prefix("//") {
        return AUTHORITY_RE.is_match(authority);
    }
    let Some((scheme, rest)) = target.split_once(':') else {
        return false;
    };
    if let Some(authority) = rest.strip_prefix("//") {
        return AUTHORITY_RE.is_match(authority);
    }
    match scheme.to_ascii_lowercase().as_str() {
        "mailto" => MAILTO_RE.is_match(rest),
        // Hierarchical schemes need an authority
        "http" | "https" | "ftp" | "ws" | "wss" => false,
        _ => !rest.is_empty(),
    }
}

/// Why a link is broken.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BrokenLinkReason {
    #[error("no page at `{path}`")]
    UnknownPage { path: String },
    #[error("page `{page_id}` has no anchor `{anchor}`")]
    UnknownAnchor { page_id: String, anchor: String },
    #[error("{0}")]
    Malformed(String),
}

/// A link that does not resolve.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("page `{page_id}`{}: broken link `{target}`: {reason}", Location(.section_index.as_ref(), Some(.field.as_str())))]
pub struct BrokenLink {
    /// Page containing the link.
    pub page_id: String,
    pub section_index: Option<usize>,
    pub field: String,
    pub target: String,
    pub reason: BrokenLinkReason,
}

/// Checks compiled pages' links against a populated registry.
#[derive(Debug)]
pub struct LinkValidator<'a> {
    registry: &'a AnchorRegistry,
    ignore: Vec<Pattern>,
    check_external_syntax: bool,
}

impl<'a> LinkValidator<'a> {
    pub fn new(registry: &'a AnchorRegistry) -> Self {
        Self {
            registry,
            ignore: Vec::new(),
            check_external_syntax: true,
        }
    }

    /// Skip internal paths matching any of `patterns`.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that is not a valid glob.
    pub fn with_ignore_patterns(
        mut self,
        patterns: &[String],
    ) -> Result<Self, glob::PatternError> {
        self.ignore = patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    #[must_use]
    pub fn check_external_syntax(mut self, enabled: bool) -> Self {
        self.check_external_syntax = enabled;
        self
    }

    /// Broken links across `pages`, grouped by page in input order.
    pub fn validate(&self, pages: &[CompiledPage]) -> Vec<BrokenLink> {
        pages.iter().flat_map(|page| self.validate_page(page)).collect()
    }

    /// Broken links on one page, in document order.
    pub fn validate_page(&self, page: &CompiledPage) -> Vec<BrokenLink> {
        page.links
            .iter()
            .filter_map(|link| {
                self.check(page, &link.target).map(|reason| broken(page, link, reason))
            })
            .collect()
    }

    fn check(&self, page: &CompiledPage, target: &str) -> Option<BrokenLinkReason> {
        match classify(target) {
            LinkKind::Malformed(message) => Some(BrokenLinkReason::Malformed(message.to_owned())),
            LinkKind::External => (self.check_external_syntax
                && !is_well_formed_external(target))
            .then(|| BrokenLinkReason::Malformed("malformed external URL".to_owned())),
            LinkKind::SamePage { fragment } => {
                page.anchors().iter().all(|a| a != fragment).then(|| {
                    BrokenLinkReason::UnknownAnchor {
                        page_id: page.id.clone(),
                        anchor: fragment.to_owned(),
                    }
                })
            }
            LinkKind::Internal { path, fragment } => self.check_internal(path, fragment),
        }
    }

    fn check_internal(&self, path: &str, fragment: Option<&str>) -> Option<BrokenLinkReason> {
        if self.ignore.iter().any(|p| p.matches(path)) {
            tracing::trace!(path, "Skipping ignored link");
            return None;
        }
        if self.registry.resolve(path, fragment) {
            return None;
        }
        match (self.registry.page_at(path), fragment) {
            (Some(page_id), Some(anchor)) => Some(BrokenLinkReason::UnknownAnchor {
                page_id: page_id.to_owned(),
                anchor: anchor.to_owned(),
            }),
            _ => Some(BrokenLinkReason::UnknownPage {
                path: path.to_owned(),
            }),
        }
    }
}

fn broken(page: &CompiledPage, link: &PageLink, reason: BrokenLinkReason) -> BrokenLink {
    BrokenLink {
        page_id: page.id.clone(),
        section_index: link.section_index,
        field: link.field.clone(),
        target: link.target.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::page::compile_page;

    fn page(id: &str, content: &str) -> CompiledPage {
        compile_page(
            &json!({
                "id": id,
                "title": id,
                "sections": [
                    {"type": "Generic", "anchorLink": "install", "title": "Install", "sectionContent": content},
                    {"type": "Generic", "anchorLink": "usage", "title": "Usage", "sectionContent": "Use it."}
                ]
            }),
            ".",
        )
        .unwrap()
    }

    fn registry(pages: &[CompiledPage]) -> AnchorRegistry {
        let mut registry = AnchorRegistry::new();
        for page in pages {
            registry.commit(&page.anchors, &page.route).unwrap();
        }
        registry
    }

    #[test]
    fn test_classify_internal_with_query() {
        assert_eq!(
            classify("/docs/search?q=hooks#results"),
            LinkKind::Internal {
                path: "/docs/search",
                fragment: Some("results"),
            }
        );
        assert_eq!(
            classify("/docs/a#"),
            LinkKind::Malformed("empty fragment")
        );
        assert!(matches!(classify("#"), LinkKind::Malformed(_)));
        assert!(matches!(classify("/docs/a b"), LinkKind::Malformed(_)));
        assert_eq!(classify("mailto:dev@example.com"), LinkKind::External);
        assert_eq!(classify("//cdn.example.com/x.js"), LinkKind::External);
    }

    #[test]
    fn test_external_syntax() {
        assert!(is_well_formed_external("https://shopify.dev/docs/apps"));
        assert!(is_well_formed_external("http://localhost:3000/"));
        assert!(is_well_formed_external("mailto:dev@example.com"));
        assert!(is_well_formed_external("tel:+15555550100"));
        assert!(!is_well_formed_external("https://"));
        assert!(!is_well_formed_external("https:shopify.dev"));
        assert!(!is_well_formed_external("mailto:nobody"));
    }

    #[test]
    fn test_cross_page_link_resolves() {
        let pages = vec![
            page("a", "See [B install](/docs/b#install)."),
            page("b", "Back to [A](/docs/a)."),
        ];
        let registry = registry(&pages);
        assert_eq!(LinkValidator::new(&registry).validate(&pages), vec![]);
    }

    #[test]
    fn test_missing_anchor_reported_once() {
        let pages = vec![
            page("a", "See [B setup](/docs/b#setup)."),
            page("b", "Nothing."),
        ];
        let registry = registry(&pages);
        let broken = LinkValidator::new(&registry).validate(&pages);

        assert_eq!(
            broken,
            vec![BrokenLink {
                page_id: "a".to_owned(),
                section_index: Some(0),
                field: "sections[0].sectionContent".to_owned(),
                target: "/docs/b#setup".to_owned(),
                reason: BrokenLinkReason::UnknownAnchor {
                    page_id: "b".to_owned(),
                    anchor: "setup".to_owned(),
                },
            }]
        );
        assert_eq!(
            broken[0].to_string(),
            "page `a`, section 0 (sections[0].sectionContent): broken link `/docs/b#setup`: page `b` has no anchor `setup`"
        );
    }

    #[test]
    fn test_unknown_page_and_ignore() {
        let pages = vec![page(
            "a",
            "[API](/docs/api/webhook) and [apps](/apps/intro) and [x](/nowhere)",
        )];
        let registry = registry(&pages);
        let patterns = vec!["/docs/api/**".to_owned(), "/apps/*".to_owned()];
        let broken = LinkValidator::new(&registry)
            .with_ignore_patterns(&patterns)
            .unwrap()
            .validate(&pages);

        let targets: Vec<_> = broken.iter().map(|b| b.target.as_str()).collect();
        assert_eq!(targets, vec!["/nowhere"]);
        assert_eq!(
            broken[0].reason,
            BrokenLinkReason::UnknownPage {
                path: "/nowhere".to_owned()
            }
        );
    }

    #[test]
    fn test_internal_links_follow_registry_resolve() {
        let pages = vec![
            page(
                "a",
                "[b](/docs/b/#usage) [b](/docs/b/) [nope](/docs/b#nope) [c](/docs/c#usage)",
            ),
            page("b", "Nothing."),
        ];
        let registry = registry(&pages);
        assert!(registry.resolve("/docs/b/", Some("usage")));

        let broken = LinkValidator::new(&registry).validate(&pages);
        let reasons: Vec<_> = broken.iter().map(|b| b.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                BrokenLinkReason::UnknownAnchor {
                    page_id: "b".to_owned(),
                    anchor: "nope".to_owned(),
                },
                BrokenLinkReason::UnknownPage {
                    path: "/docs/c".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_same_page_fragment() {
        let pages = vec![page("a", "Jump to [usage](#usage) or [faq](#faq).")];
        let registry = registry(&pages);
        let broken = LinkValidator::new(&registry).validate(&pages);

        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].target, "#faq");
    }

    #[test]
    fn test_external_check_can_be_disabled() {
        let pages = vec![page("a", "[bad](https://) and [rel](guides/x)")];
        let registry = registry(&pages);

        let broken = LinkValidator::new(&registry).validate(&pages);
        assert_eq!(broken.len(), 2);

        let broken = LinkValidator::new(&registry)
            .check_external_syntax(false)
            .validate(&pages);
        let targets: Vec<_> = broken.iter().map(|b| b.target.as_str()).collect();
        assert_eq!(targets, vec!["guides/x"]);
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let registry = AnchorRegistry::new();
        let result = LinkValidator::new(&registry).with_ignore_patterns(&["[".to_owned()]);
        assert!(result.is_err());
    }
}
