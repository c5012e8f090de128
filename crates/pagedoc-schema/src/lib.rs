//! Page schema model and validation for pagedoc.
//!
//! A page description arrives as an untyped value (parsed from JSON or YAML
//! by the caller or with [`parse_json`] / [`parse_yaml`]). [`validate`]
//! checks it against the shape of its declared section kinds and produces a
//! typed [`PageSchema`]. Nothing downstream ever sees an unvalidated page.
//!
//! # Example
//!
//! ```
//! use pagedoc_schema::{Section, parse_json, validate};
//!
//! let raw = parse_json(r#"{
//!     "id": "guide-webhooks",
//!     "title": "Subscribing to webhooks",
//!     "sections": [{
//!         "type": "Resource",
//!         "anchorLink": "resources",
//!         "title": "Resources",
//!         "resources": [{"name": "authenticate.webhook", "url": "/docs/api/authenticate/webhook"}]
//!     }]
//! }"#).unwrap();
//!
//! let page = validate(&raw).unwrap();
//! assert_eq!(page.id, "guide-webhooks");
//! assert!(matches!(page.sections[0], Section::Resource(_)));
//! ```

mod error;
mod types;
mod validate;

pub use error::{InputError, SchemaError, SchemaErrorKind};
pub use types::{
    CodeRef, Codeblock, GenericSection, PageSchema, Resource, ResourceSection, Section,
    SectionKind, Tab,
};
pub use validate::{is_valid_anchor, is_valid_language, validate};

/// Parse a JSON page description into a raw value.
///
/// # Errors
///
/// Returns `InputError::Json` if the text is not valid JSON.
pub fn parse_json(text: &str) -> Result<serde_json::Value, InputError> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a YAML page description into a raw value.
///
/// # Errors
///
/// Returns `InputError::Yaml` if the text is not valid YAML or cannot be
/// represented as JSON (e.g. non-string map keys).
pub fn parse_yaml(text: &str) -> Result<serde_json::Value, InputError> {
    Ok(serde_yaml::from_str(text)?)
}
