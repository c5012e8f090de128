//! Configuration management for pagedoc.
//!
//! Parses `pagedoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Settings from the invoking build tool can be applied during load via
//! [`Overrides`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.route_prefix`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Override route prefix for pages without an explicit route.
    pub route_prefix: Option<String>,
    /// Override worker count.
    pub jobs: Option<usize>,
    /// Override duplicate anchor policy.
    pub duplicate_anchors: Option<AnchorPolicy>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pagedoc.toml";

/// Upper bound for `build.jobs`.
const MAX_JOBS: usize = 512;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page route configuration as written in TOML.
    docs: DocsConfigRaw,
    /// Build configuration.
    pub build: BuildConfig,
    /// Link validation configuration.
    pub links: LinksConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    route_prefix: Option<String>,
}

/// Resolved docs configuration.
#[derive(Clone, Debug)]
pub struct DocsConfig {
    /// Prefix used to build `<prefix>/<page id>` routes.
    pub route_prefix: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            route_prefix: "/docs".to_owned(),
        }
    }
}

impl DocsConfig {
    /// Route of a page that does not declare one.
    ///
    /// ```
    /// use pagedoc_config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.docs_resolved.default_route("guide-webhooks"), "/docs/guide-webhooks");
    /// ```
    #[must_use]
    pub fn default_route(&self, page_id: &str) -> String {
        format!("{}/{page_id}", self.route_prefix.trim_end_matches('/'))
    }
}

/// What to do when a page reuses an anchor id.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPolicy {
    /// Fail the page with a duplicate anchor error.
    #[default]
    Reject,
    /// Keep the first registration and log a warning for later ones.
    FirstWins,
}

/// Build configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of worker threads. `0` lets rayon decide.
    pub jobs: usize,
    /// Duplicate anchor policy.
    pub duplicate_anchors: AnchorPolicy,
    /// Allowed tab languages. `None` accepts any well-formed identifier.
    pub languages: Option<Vec<String>>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: 0,
            duplicate_anchors: AnchorPolicy::Reject,
            languages: None,
        }
    }
}

/// Link validation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Glob patterns for internal paths that live outside the compiled set.
    pub ignore: Vec<String>,
    /// Whether external URLs are checked for syntax.
    pub check_external_syntax: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            check_external_syntax: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.route_prefix`").
        field: String,
        /// Error message (e.g., "${`DOCS_PREFIX`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pagedoc.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&Overrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(prefix) = &overrides.route_prefix {
            self.docs_resolved.route_prefix.clone_from(prefix);
        }
        if let Some(jobs) = overrides.jobs {
            self.build.jobs = jobs;
        }
        if let Some(policy) = overrides.duplicate_anchors {
            self.build.duplicate_anchors = policy;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.resolve_docs();
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        self.validate_build()?;
        self.validate_links()?;
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        let prefix = &self.docs_resolved.route_prefix;
        require_non_empty(prefix, "docs.route_prefix")?;
        if !prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "docs.route_prefix must start with /".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        if self.build.jobs > MAX_JOBS {
            return Err(ConfigError::Validation(format!(
                "build.jobs cannot exceed {MAX_JOBS}"
            )));
        }
        if let Some(languages) = &self.build.languages {
            for (i, lang) in languages.iter().enumerate() {
                require_non_empty(lang, &format!("build.languages[{i}]"))?;
            }
        }
        Ok(())
    }

    fn validate_links(&self) -> Result<(), ConfigError> {
        for (i, pattern) in self.links.ignore.iter().enumerate() {
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("links.ignore[{i}] is not a valid pattern: {e}"))
            })?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref prefix) = self.docs.route_prefix {
            self.docs.route_prefix = Some(expand::expand_env(prefix, "docs.route_prefix")?);
        }
        Ok(())
    }

    /// Fill the resolved docs section from the raw TOML values.
    fn resolve_docs(&mut self) {
        if let Some(prefix) = &self.docs.route_prefix {
            self.docs_resolved.route_prefix.clone_from(prefix);
        }
    }
}
