//! Ordered classification of upstream failures.
//!
//! Each rule is a predicate over the typed [`UpstreamFailure`] shape. Rules
//! run in order and the first match wins; a failure no rule claims is
//! [`Classification::Unspecified`].
//!
//! 1. missing required field (validation message carries the required marker
//!    and `validation.keys` names at least one field)
//! 2. invalid parameter (any other truthy `validation`)
//! 3. transient backend failure (`reason` matches a transient pattern)
//! 4. request-signature rejection (`statusCode` 401)
//! 5. oversized body (`statusCode` 413 with the body-limit message)

use crate::{definitions, Errno, TranslatorConfig, UpstreamFailure};
use serde_json::Value;

/// Message prefixes the HTTP framework uses when it rejects a body for size.
const BODY_TOO_LARGE_PREFIXES: [&str; 2] = [
    "Payload content length greater than maximum allowed",
    "Payload size greater than maximum allowed",
];

/// Authentication-library messages that mean the token itself is unknown.
const UNKNOWN_CREDENTIALS: [&str; 2] = ["Unknown credentials", "Invalid credentials"];

/// Outcome of classifying one failure. Borrows the parts of the input the
/// resulting error needs.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Classification<'a> {
    MissingParameter { param: &'a str },
    InvalidParameter { validation: &'a Value },
    BackendServiceFailure { reason: &'a str },
    InvalidToken { upstream_message: &'a str },
    InvalidTimestamp,
    InvalidNonce,
    InvalidSignature { upstream_message: Option<&'a str> },
    RequestBodyTooLarge,
    /// No rule matched.
    Unspecified,
}

impl Classification<'_> {
    /// Stable rule label for logs.
    pub const fn rule_name(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "missing_parameter",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::BackendServiceFailure { .. } => "transient_reason",
            Self::InvalidToken { .. } => "invalid_token",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidNonce => "invalid_nonce",
            Self::InvalidSignature { .. } => "invalid_signature",
            Self::RequestBodyTooLarge => "request_too_large",
            Self::Unspecified => "unspecified",
        }
    }

    /// The errno this classification produces.
    pub fn errno(&self) -> &'static Errno {
        match self {
            Self::MissingParameter { .. } => &definitions::MISSING_PARAMETER,
            Self::InvalidParameter { .. } => &definitions::INVALID_PARAMETER,
            Self::BackendServiceFailure { .. } => &definitions::BACKEND_SERVICE_FAILURE,
            Self::InvalidToken { .. } => &definitions::INVALID_TOKEN,
            Self::InvalidTimestamp => &definitions::INVALID_TIMESTAMP,
            Self::InvalidNonce => &definitions::INVALID_NONCE,
            Self::InvalidSignature { .. } => &definitions::INVALID_REQUEST_SIGNATURE,
            Self::RequestBodyTooLarge => &definitions::REQUEST_TOO_LARGE,
            Self::Unspecified => &definitions::UNEXPECTED_ERROR,
        }
    }
}

type Rule = for<'a> fn(&'a UpstreamFailure, &TranslatorConfig) -> Option<Classification<'a>>;

const RULES: [Rule; 5] = [
    missing_parameter,
    invalid_parameter,
    transient_reason,
    request_signature,
    body_too_large,
];

/// Run the rules in order against `failure`.
pub fn classify<'a>(failure: &'a UpstreamFailure, config: &TranslatorConfig) -> Classification<'a> {
    RULES
        .iter()
        .find_map(|rule| rule(failure, config))
        .unwrap_or(Classification::Unspecified)
}

fn missing_parameter<'a>(failure: &'a UpstreamFailure, config: &TranslatorConfig) -> Option<Classification<'a>> {
    let payload = failure.payload()?;
    let message = payload.message.as_deref()?;
    if !message.contains(config.required_marker.as_str()) {
        return None;
    }
    // Only the first missing key is reported.
    let param = payload.validation_keys().next()?;
    Some(Classification::MissingParameter { param })
}

fn invalid_parameter<'a>(failure: &'a UpstreamFailure, _: &TranslatorConfig) -> Option<Classification<'a>> {
    let validation = failure.payload()?.validation.as_ref()?;
    is_truthy(validation).then_some(Classification::InvalidParameter { validation })
}

fn transient_reason<'a>(failure: &'a UpstreamFailure, config: &TranslatorConfig) -> Option<Classification<'a>> {
    let reason = failure.reason()?;
    config
        .is_transient_reason(reason)
        .then_some(Classification::BackendServiceFailure { reason })
}

fn request_signature<'a>(failure: &'a UpstreamFailure, _: &TranslatorConfig) -> Option<Classification<'a>> {
    let payload = failure.payload()?;
    if payload.status_code != Some(401) {
        return None;
    }
    let message = payload.message.as_deref();
    Some(match message {
        Some(m) if UNKNOWN_CREDENTIALS.contains(&m) => Classification::InvalidToken { upstream_message: m },
        Some("Stale timestamp") => Classification::InvalidTimestamp,
        Some("Invalid nonce") => Classification::InvalidNonce,
        _ => Classification::InvalidSignature { upstream_message: message },
    })
}

fn body_too_large<'a>(failure: &'a UpstreamFailure, _: &TranslatorConfig) -> Option<Classification<'a>> {
    let payload = failure.payload()?;
    let message = payload.message.as_deref()?;
    let too_large = payload.status_code == Some(413)
        && BODY_TOO_LARGE_PREFIXES.iter().any(|prefix| message.starts_with(prefix));
    too_large.then_some(Classification::RequestBodyTooLarge)
}

/// JavaScript-style truthiness: `null`, `false`, `0` and `""` are falsy;
/// arrays and objects are always truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpstreamPayload;
    use serde_json::json;

    fn classify_json(value: Value) -> (UpstreamFailure, TranslatorConfig) {
        (UpstreamFailure::from_value(&value), TranslatorConfig::default())
    }

    #[test]
    fn missing_parameter_reports_first_key() {
        let (failure, config) = classify_json(json!({
            "output": { "payload": {
                "message": "child \"bar\" fails because [\"bar\" is required]",
                "validation": { "keys": ["bar", "baz"] }
            } }
        }));
        assert_eq!(classify(&failure, &config), Classification::MissingParameter { param: "bar" });
    }

    #[test]
    fn required_marker_without_keys_is_invalid_parameter() {
        let (failure, config) = classify_json(json!({
            "output": { "payload": { "message": "x is required", "validation": { "keys": [] } } }
        }));
        assert!(matches!(classify(&failure, &config), Classification::InvalidParameter { .. }));
    }

    #[test]
    fn non_missing_validation_is_invalid_parameter() {
        let (failure, config) = classify_json(json!({ "output": { "payload": { "validation": "foo" } } }));
        assert_eq!(
            classify(&failure, &config),
            Classification::InvalidParameter { validation: &json!("foo") }
        );
    }

    #[test]
    fn falsy_validation_is_ignored() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            let (failure, config) = classify_json(json!({ "output": { "payload": { "validation": falsy } } }));
            assert_eq!(classify(&failure, &config), Classification::Unspecified);
        }
    }

    #[test]
    fn validation_beats_transient_reason() {
        let (failure, config) = classify_json(json!({
            "output": { "payload": { "validation": { "source": "query" } } },
            "reason": "socket hang up"
        }));
        assert!(matches!(classify(&failure, &config), Classification::InvalidParameter { .. }));
    }

    #[test]
    fn transient_reasons() {
        for reason in ["socket hang up", "ECONNREFUSED", "read ECONNRESET"] {
            let (failure, config) = classify_json(json!({
                "output": { "payload": { "errno": 999, "statusCode": 500 } },
                "reason": reason
            }));
            assert_eq!(classify(&failure, &config), Classification::BackendServiceFailure { reason });
        }
    }

    #[test]
    fn signature_rejections() {
        let cases = [
            ("Unknown credentials", "invalid_token"),
            ("Invalid credentials", "invalid_token"),
            ("Stale timestamp", "invalid_timestamp"),
            ("Invalid nonce", "invalid_nonce"),
            ("Bad mac", "invalid_signature"),
        ];
        for (message, rule) in cases {
            let (failure, config) = classify_json(json!({
                "output": { "payload": { "statusCode": 401, "message": message } }
            }));
            assert_eq!(classify(&failure, &config).rule_name(), rule, "{message}");
        }
    }

    #[test]
    fn body_too_large_needs_both_status_and_message() {
        let (failure, config) = classify_json(json!({
            "output": { "payload": {
                "statusCode": 413,
                "message": "Payload content length greater than maximum allowed: 1048576"
            } }
        }));
        assert_eq!(classify(&failure, &config), Classification::RequestBodyTooLarge);

        let (failure, config) = classify_json(json!({
            "output": { "payload": { "statusCode": 413, "message": "Too big" } }
        }));
        assert_eq!(classify(&failure, &config), Classification::Unspecified);
    }

    #[test]
    fn empty_shapes_are_unspecified() {
        for value in [json!({}), json!({ "output": {} }), json!({ "output": { "payload": {} } })] {
            let (failure, config) = classify_json(value);
            assert_eq!(classify(&failure, &config), Classification::Unspecified);
        }
    }

    #[test]
    fn custom_marker() {
        let failure = UpstreamFailure::from_value(&json!({
            "output": { "payload": { "message": "email is mandatory", "validation": { "keys": ["email"] } } }
        }));
        let config = TranslatorConfig {
            required_marker: "is mandatory".into(),
            ..TranslatorConfig::default()
        };
        assert_eq!(classify(&failure, &config), Classification::MissingParameter { param: "email" });
    }

    #[test]
    fn non_string_keys_are_skipped() {
        let (failure, config) = classify_json(json!({
            "output": { "payload": { "message": "uid is required", "validation": { "keys": [1, "uid"] } } }
        }));
        assert_eq!(classify(&failure, &config), Classification::MissingParameter { param: "uid" });
    }

    #[test]
    fn typed_payload_classifies_like_json() {
        let failure = UpstreamFailure::with_payload(UpstreamPayload {
            status_code: Some(401),
            message: Some("Invalid nonce".into()),
            ..UpstreamPayload::default()
        });
        assert_eq!(classify(&failure, &TranslatorConfig::default()), Classification::InvalidNonce);
        assert_eq!(failure.reason(), None);
    }

    #[test]
    fn classification_errnos() {
        assert_eq!(Classification::Unspecified.errno().code(), 999);
        assert_eq!(Classification::RequestBodyTooLarge.errno().code(), 113);
        assert_eq!(Classification::BackendServiceFailure { reason: "x" }.errno().code(), 203);
    }
}
