//! Anchor registry for cross-page link resolution.
//!
//! Maps `(page id, anchor id)` to the resolved link path `route#anchor`.
//! Pages stage their anchors in a [`PageAnchors`] set while compiling and
//! commit them in one step, so a page that fails leaves no partial entries.

use std::collections::HashMap;

/// Registry failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate anchor `{anchor}` on page `{page_id}`")]
    DuplicateAnchor { page_id: String, anchor: String },
    #[error("page id `{page_id}` is already registered")]
    DuplicatePage { page_id: String },
    #[error("route `{route}` is already used by page `{existing}`")]
    DuplicateRoute { route: String, existing: String },
    #[error("page `{page_id}` is not registered")]
    UnknownPage { page_id: String },
}

/// Registered pages and their anchors.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    /// Page id to route.
    routes: HashMap<String, String>,
    /// Route to page id.
    pages: HashMap<String, String>,
    /// `(page id, anchor)` to `route#anchor`.
    anchors: HashMap<(String, String), String>,
}

impl AnchorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page under `route`.
    ///
    /// Routes are compared without a trailing slash.
    pub fn register_page(&mut self, page_id: &str, route: &str) -> Result<(), RegistryError> {
        let route = normalize_route(route);
        if self.routes.contains_key(page_id) {
            return Err(RegistryError::DuplicatePage {
                page_id: page_id.to_owned(),
            });
        }
        if let Some(existing) = self.pages.get(route) {
            return Err(RegistryError::DuplicateRoute {
                route: route.to_owned(),
                existing: existing.clone(),
            });
        }
        self.routes.insert(page_id.to_owned(), route.to_owned());
        self.pages.insert(route.to_owned(), page_id.to_owned());
        Ok(())
    }

    /// Register one anchor and return its resolved link path.
    ///
    /// On a duplicate the existing entry is left untouched.
    pub fn register(&mut self, page_id: &str, anchor: &str) -> Result<&str, RegistryError> {
        let Some(route) = self.routes.get(page_id) else {
            return Err(RegistryError::UnknownPage {
                page_id: page_id.to_owned(),
            });
        };
        let key = (page_id.to_owned(), anchor.to_owned());
        if self.anchors.contains_key(&key) {
            return Err(RegistryError::DuplicateAnchor {
                page_id: page_id.to_owned(),
                anchor: anchor.to_owned(),
            });
        }
        let resolved = format!("{route}#{anchor}");
        let entry = self.anchors.entry(key).or_insert(resolved);
        Ok(entry.as_str())
    }

    /// Register a page together with its staged anchors.
    ///
    /// Either everything is registered or nothing is.
    pub fn commit(&mut self, staged: &PageAnchors, route: &str) -> Result<(), RegistryError> {
        self.register_page(&staged.page_id, route)?;
        for anchor in &staged.order {
            // Staged anchors are already unique and the page is new
            self.register(&staged.page_id, anchor)?;
        }
        Ok(())
    }

    /// Resolved link path for an anchor.
    pub fn get(&self, page_id: &str, anchor: &str) -> Option<&str> {
        self.anchors
            .get(&(page_id.to_owned(), anchor.to_owned()))
            .map(String::as_str)
    }

    /// Page id registered at `route`.
    pub fn page_at(&self, route: &str) -> Option<&str> {
        self.pages.get(normalize_route(route)).map(String::as_str)
    }

    /// Route of a registered page.
    pub fn route_of(&self, page_id: &str) -> Option<&str> {
        self.routes.get(page_id).map(String::as_str)
    }

    /// Whether `path` (and `fragment`, if given) names a registered target.
    pub fn resolve(&self, path: &str, fragment: Option<&str>) -> bool {
        let Some(page_id) = self.page_at(path) else {
            return false;
        };
        fragment.is_none_or(|anchor| self.get(page_id, anchor).is_some())
    }

    pub fn page_count(&self) -> usize {
        self.routes.len()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

/// Anchors of one page collected before commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageAnchors {
    page_id: String,
    /// Anchor to index of the section that declared it first.
    first: HashMap<String, usize>,
    order: Vec<String>,
}

impl PageAnchors {
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            first: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Stage an anchor declared by section `section_index`.
    ///
    /// Returns the index of the earlier section if the anchor is taken.
    pub fn stage(&mut self, anchor: &str, section_index: usize) -> Result<(), usize> {
        if let Some(&first) = self.first.get(anchor) {
            return Err(first);
        }
        self.first.insert(anchor.to_owned(), section_index);
        self.order.push(anchor.to_owned());
        Ok(())
    }

    /// Staged anchors in declaration order.
    pub fn anchors(&self) -> &[String] {
        &self.order
    }

    /// Section that owns `anchor`.
    pub fn owner(&self, anchor: &str) -> Option<usize> {
        self.first.get(anchor).copied()
    }
}

/// Strip a trailing slash, keeping the root route intact.
pub(crate) fn normalize_route(route: &str) -> &str {
    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn registry_with_page() -> AnchorRegistry {
        let mut registry = AnchorRegistry::new();
        registry
            .register_page("guide-webhooks", "/docs/guide-webhooks")
            .unwrap();
        registry
    }

    #[test]
    fn test_register_returns_resolved_path() {
        let mut registry = registry_with_page();
        let path = registry.register("guide-webhooks", "config").unwrap();
        assert_eq!(path, "/docs/guide-webhooks#config");
    }

    #[test]
    fn test_duplicate_anchor_keeps_first_entry() {
        let mut registry = registry_with_page();
        registry.register("guide-webhooks", "config").unwrap();

        let err = registry.register("guide-webhooks", "config").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateAnchor {
                page_id: "guide-webhooks".to_owned(),
                anchor: "config".to_owned(),
            }
        );
        assert_eq!(
            registry.get("guide-webhooks", "config"),
            Some("/docs/guide-webhooks#config")
        );
        assert_eq!(registry.anchor_count(), 1);
    }

    #[test]
    fn test_same_anchor_on_different_pages() {
        let mut registry = registry_with_page();
        registry.register_page("guide-billing", "/docs/guide-billing").unwrap();
        registry.register("guide-webhooks", "config").unwrap();
        registry.register("guide-billing", "config").unwrap();
        assert_eq!(registry.anchor_count(), 2);
    }

    #[test]
    fn test_register_unknown_page() {
        let mut registry = AnchorRegistry::new();
        let err = registry.register("missing", "a").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownPage { .. }));
    }

    #[test]
    fn test_duplicate_page_and_route() {
        let mut registry = registry_with_page();
        assert!(matches!(
            registry.register_page("guide-webhooks", "/docs/other"),
            Err(RegistryError::DuplicatePage { .. })
        ));
        assert!(matches!(
            registry.register_page("other", "/docs/guide-webhooks/"),
            Err(RegistryError::DuplicateRoute { ref existing, .. }) if existing == "guide-webhooks"
        ));
        assert_eq!(registry.page_count(), 1);
    }

    #[test]
    fn test_resolve() {
        let mut registry = registry_with_page();
        registry.register("guide-webhooks", "config").unwrap();

        assert!(registry.resolve("/docs/guide-webhooks", None));
        assert!(registry.resolve("/docs/guide-webhooks/", Some("config")));
        assert!(!registry.resolve("/docs/guide-webhooks", Some("endpoints")));
        assert!(!registry.resolve("/docs/other", None));
    }

    #[test]
    fn test_stage_reports_first_owner() {
        let mut staged = PageAnchors::new("guide-webhooks");
        staged.stage("config", 0).unwrap();
        staged.stage("endpoints", 2).unwrap();

        assert_eq!(staged.stage("config", 1), Err(0));
        assert_eq!(staged.anchors(), ["config", "endpoints"]);
        assert_eq!(staged.owner("endpoints"), Some(2));
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let mut registry = registry_with_page();
        let mut staged = PageAnchors::new("guide-webhooks");
        staged.stage("config", 0).unwrap();

        let err = registry.commit(&staged, "/docs/again").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePage { .. }));
        assert_eq!(registry.anchor_count(), 0);

        let mut staged = PageAnchors::new("guide-billing");
        staged.stage("plans", 0).unwrap();
        registry.commit(&staged, "/docs/guide-billing").unwrap();
        assert_eq!(
            registry.get("guide-billing", "plans"),
            Some("/docs/guide-billing#plans")
        );
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("/docs/a/"), "/docs/a");
        assert_eq!(normalize_route("/"), "/");
        assert_eq!(normalize_route("/docs"), "/docs");
    }
}
