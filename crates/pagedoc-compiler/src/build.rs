//! Compiling a set of pages.
//!
//! Pages compile in parallel on a rayon pool. Their anchors are then
//! committed to a fresh [`AnchorRegistry`] one page at a time, in input
//! order, so repeated builds of the same inputs give the same registry and
//! the same diagnostics. Links are validated last, against the full set.

use std::time::Instant;

use pagedoc_config::Config;
use rayon::prelude::*;

use crate::anchors::AnchorRegistry;
use crate::error::{PageError, PageErrorKind};
use crate::links::{BrokenLink, LinkValidator};
use crate::page::{CompileOptions, CompiledPage, PageCompiler, PageInput};

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Build setup failure. Page-level problems are reported in [`BuildReport`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Invalid link ignore pattern: {0}")]
    IgnorePattern(#[from] glob::PatternError),
}

/// Outcome of a build.
#[derive(Debug)]
pub struct BuildReport {
    /// Successfully compiled pages, in input order.
    pub pages: Vec<CompiledPage>,
    /// Pages that failed, in input order.
    pub failures: Vec<PageError>,
    pub broken_links: Vec<BrokenLink>,
    /// Anchors of every successful page.
    pub registry: AnchorRegistry,
}

impl BuildReport {
    /// Whether every page compiled and every link resolved.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.broken_links.is_empty()
    }

    pub fn page(&self, id: &str) -> Option<&CompiledPage> {
        self.pages.iter().find(|page| page.id == id)
    }
}

/// Compiles page sets.
///
/// ```
/// use pagedoc_compiler::{Builder, PageInput};
///
/// let page = PageInput::from_json_str(
///     r##"{"id": "intro", "title": "Intro", "sections": [
///         {"type": "Generic", "anchorLink": "start", "title": "Start", "sectionContent": "See [usage](#usage)."},
///         {"type": "Generic", "anchorLink": "usage", "title": "Usage", "sectionContent": "Run it."}
///     ]}"##,
///     ".",
/// ).unwrap();
///
/// let report = Builder::default().build(&[page]).unwrap();
/// assert!(report.is_clean());
/// assert_eq!(report.registry.get("intro", "usage"), Some("/docs/intro#usage"));
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    compiler: PageCompiler,
    jobs: usize,
    ignore: Vec<String>,
    check_external_syntax: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl Builder {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            compiler: PageCompiler::new(options),
            jobs: 0,
            ignore: Vec::new(),
            check_external_syntax: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            compiler: PageCompiler::new(CompileOptions::from(config)),
            jobs: config.build.jobs,
            ignore: config.links.ignore.clone(),
            check_external_syntax: config.links.check_external_syntax,
        }
    }

    /// Worker thread count; `0` lets rayon decide.
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Internal path patterns left out of link validation.
    #[must_use]
    pub fn ignore_links(mut self, patterns: Vec<String>) -> Self {
        self.ignore = patterns;
        self
    }

    #[must_use]
    pub fn check_external_syntax(mut self, enabled: bool) -> Self {
        self.check_external_syntax = enabled;
        self
    }

    /// Compile `inputs` and validate their links.
    ///
    /// # Errors
    ///
    /// Fails only if the thread pool cannot be created or an ignore pattern
    /// is invalid. Page failures and broken links go into the report.
    pub fn build(&self, inputs: &[PageInput]) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        tracing::info!(pages = inputs.len(), jobs = self.jobs, "Compiling pages");

        // Validate patterns before doing any work
        let empty = AnchorRegistry::new();
        LinkValidator::new(&empty).with_ignore_patterns(&self.ignore)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;
        let results: Vec<Result<CompiledPage, PageError>> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| self.compiler.compile_input(input))
                .collect()
        });

        let mut registry = AnchorRegistry::new();
        let mut pages = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for result in results {
            let page = match result {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(page = %err.page_id, error = %err, "Page failed to compile");
                    failures.push(err);
                    continue;
                }
            };
            if let Err(err) = registry.commit(&page.anchors, &page.route) {
                let err = PageError::new(page.id.as_str(), PageErrorKind::Registry(err));
                tracing::warn!(page = %page.id, error = %err, "Page rejected");
                failures.push(err);
                continue;
            }
            pages.push(page);
        }

        let validator = LinkValidator::new(&registry)
            .with_ignore_patterns(&self.ignore)?
            .check_external_syntax(self.check_external_syntax);
        let broken_links = validator.validate(&pages);
        for link in &broken_links {
            tracing::warn!(page = %link.page_id, target = %link.target, "{}", link.reason);
        }

        tracing::info!(
            compiled = pages.len(),
            failed = failures.len(),
            broken_links = broken_links.len(),
            anchors = registry.anchor_count(),
            elapsed_ms = elapsed_ms(start),
            "Build finished"
        );

        Ok(BuildReport {
            pages,
            failures,
            broken_links,
            registry,
        })
    }
}
