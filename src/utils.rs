//!
//! Utility types and functions shared across the crate.
//!
//! - [`RequestIdGenerator`] - Generates or preserves request IDs for tracing
//! - [`replace_handlebars_with_env`] - Template substitution for environment variables
//! - [`humanize_title`] - Turns `RESOURCE_NOT_FOUND` into `Resource Not Found`
//!

use {
    http::{HeaderValue, Request},
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
    tower_http::request_id::{MakeRequestId, RequestId},
    uuid::{ContextV7, Timestamp, Uuid},
};

/// Matches `{{ VAR_NAME }}` with optional whitespace around the variable name.
/// Variable names must be uppercase letters, digits, or underscores.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// Request ID generator for request correlation.
///
/// Implements `tower-http`'s `MakeRequestId` to either preserve an existing
/// `x-request-id` header or generate a new UUIDv7 when none is present.
///
/// # Examples
///
/// ```
/// use axum_dispatch::RequestIdGenerator;
/// use tower_http::request_id::SetRequestIdLayer;
///
/// let layer = SetRequestIdLayer::x_request_id(RequestIdGenerator);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequestIdGenerator;

impl MakeRequestId for RequestIdGenerator {
    fn make_request_id<B>(&mut self, req: &Request<B>) -> Option<RequestId> {
        match req.headers().get("x-request-id") {
            Some(value) => Some(RequestId::new(value.clone())),
            None => {
                let cx = ContextV7::new().with_additional_precision();
                let uuid = Uuid::new_v7(Timestamp::now(cx));
                let value = HeaderValue::from_str(&uuid.to_string()).ok()?;
                Some(RequestId::new(value))
            }
        }
    }
}

/// Replaces handlebars-style placeholders with environment variable values.
///
/// Searches the input for `{{ VAR_NAME }}` and substitutes the value of the
/// environment variable. `{{VAR}}`, `{{ VAR }}` and `{{  VAR  }}` are
/// equivalent. Unset variables are replaced with an empty string and a
/// warning is logged.
///
/// # Examples
///
/// ```
/// use axum_dispatch::replace_handlebars_with_env;
///
/// let template = "Value: {{ SURELY_NOT_SET_ANYWHERE }}";
/// assert_eq!(replace_handlebars_with_env(template), "Value: ");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}

/// Converts a machine-readable error title into words.
///
/// ```
/// use axum_dispatch::humanize_title;
///
/// assert_eq!(humanize_title("RESOURCE_NOT_FOUND"), "Resource Not Found");
/// ```
pub fn humanize_title(title: &str) -> String {
    title
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Strings without handlebars patterns should pass through unchanged
        #[test]
        fn handlebars_no_pattern_unchanged(s in "[^{}]*") {
            let result = replace_handlebars_with_env(&s);
            prop_assert_eq!(result, s);
        }

        #[test]
        fn handlebars_valid_pattern_substituted(
            var_name in "[A-Z][A-Z0-9_]{0,10}",
            var_value in "[a-zA-Z0-9_]{1,20}",
            prefix in "[^{}]{0,10}",
            suffix in "[^{}]{0,10}"
        ) {
            let test_var = format!("PROPTEST_{var_name}");
            unsafe { std::env::set_var(&test_var, &var_value); }

            let input = format!("{prefix}{{{{ {test_var} }}}}{suffix}");
            let result = replace_handlebars_with_env(&input);
            let expected = format!("{prefix}{var_value}{suffix}");

            unsafe { std::env::remove_var(&test_var); }

            prop_assert_eq!(result, expected);
        }

        #[test]
        fn handlebars_missing_var_empty(var_name in "[A-Z][A-Z0-9_]{5,15}") {
            let test_var = format!("PROPTEST_MISSING_{var_name}");
            unsafe { std::env::remove_var(&test_var); }

            let input = format!("value={{{{ {test_var} }}}}");
            let result = replace_handlebars_with_env(&input);

            prop_assert_eq!(result, "value=");
        }
    }

    #[test]
    fn test_humanize_title() {
        assert_eq!(humanize_title("METHOD_NOT_ALLOWED"), "Method Not Allowed");
        assert_eq!(humanize_title("USER_NOT_FOUND"), "User Not Found");
        assert_eq!(humanize_title("single"), "Single");
        assert_eq!(humanize_title("__A__B"), "A B");
        assert_eq!(humanize_title(""), "");
    }

    #[test]
    fn test_request_id_is_preserved() {
        let request = Request::builder()
            .header("x-request-id", "abc-123")
            .body(())
            .unwrap();
        let id = RequestIdGenerator.make_request_id(&request).unwrap();
        assert_eq!(id.header_value(), "abc-123");
    }

    #[test]
    fn test_request_id_is_generated_as_uuid_v7() {
        let request = Request::builder().body(()).unwrap();
        let id = RequestIdGenerator.make_request_id(&request).unwrap();
        let uuid = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(uuid.get_version_num(), 7);
    }
}
