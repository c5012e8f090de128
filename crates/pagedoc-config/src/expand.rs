//! `${VAR}` and `${VAR:-default}` expansion for string settings.

use crate::ConfigError;

/// Expand environment variable references in a configuration value.
///
/// Only the braced form is recognized. A value without `${` is returned as is,
/// so strings such as `/docs/$id` survive untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that had no value and no default.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_route_prefix() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PAGEDOC_TEST_PREFIX", "/docs/api");
        }
        let result = expand_env("${PAGEDOC_TEST_PREFIX}", "docs.route_prefix").unwrap();
        assert_eq!(result, "/docs/api");
        unsafe {
            std::env::remove_var("PAGEDOC_TEST_PREFIX");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PAGEDOC_TEST_UNSET");
        }
        let result = expand_env("${PAGEDOC_TEST_UNSET:-docs}/pages", "docs.route_prefix").unwrap();
        assert_eq!(result, "docs/pages");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PAGEDOC_TEST_MISSING");
        }
        let err = expand_env("${PAGEDOC_TEST_MISSING}", "docs.route_prefix").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("PAGEDOC_TEST_MISSING"));
        assert!(msg.contains("docs.route_prefix"));
    }

    #[test]
    fn test_bare_dollar_left_alone() {
        let result = expand_env("/docs/$page", "docs.route_prefix").unwrap();
        assert_eq!(result, "/docs/$page");
    }
}
