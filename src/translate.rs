//! Failure translation.
//!
//! [`translate`] is the single entry point request handlers call when a
//! route fails: whatever went wrong comes out as an [`AppError`] with a stable
//! errno, an HTTP status and a client-safe payload. It never fails and never
//! panics; anything it cannot recognise becomes errno 999.

use crate::classify::{classify, Classification};
use crate::{AppError, ConfigError, RequestContext, TranslatorConfig, UpstreamFailure};
use std::io;
use std::sync::LazyLock;

static DEFAULT_TRANSLATOR: LazyLock<Translator> = LazyLock::new(Translator::default);

/// Anything a handler may hand to the translator.
#[derive(Debug)]
pub enum Failure {
    /// Already translated; passes through unchanged.
    App(AppError),
    /// A framework, validation or transport failure.
    Upstream(UpstreamFailure),
    /// Nothing usable was thrown.
    Absent,
}

impl From<AppError> for Failure {
    fn from(error: AppError) -> Self {
        Self::App(error)
    }
}

impl From<UpstreamFailure> for Failure {
    fn from(failure: UpstreamFailure) -> Self {
        Self::Upstream(failure)
    }
}

impl From<Option<UpstreamFailure>> for Failure {
    fn from(failure: Option<UpstreamFailure>) -> Self {
        failure.map_or(Self::Absent, Self::Upstream)
    }
}

impl From<serde_json::Value> for Failure {
    fn from(value: serde_json::Value) -> Self {
        Self::from(&value)
    }
}

impl From<&serde_json::Value> for Failure {
    fn from(value: &serde_json::Value) -> Self {
        if value.is_null() {
            Self::Absent
        } else {
            Self::Upstream(UpstreamFailure::from_value(value))
        }
    }
}

impl From<io::Error> for Failure {
    fn from(error: io::Error) -> Self {
        Self::Upstream(UpstreamFailure::from(&error))
    }
}

impl From<()> for Failure {
    fn from((): ()) -> Self {
        Self::Absent
    }
}

/// Translates failures according to a [`TranslatorConfig`].
///
/// Most callers use the free [`translate`] function, which runs with the
/// default configuration.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    /// Build a translator after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration would make a rule match
    /// every input.
    pub fn new(config: TranslatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[inline]
    pub const fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Turn `failure` into an [`AppError`].
    ///
    /// `request` is only read when the failure ends up unspecified.
    pub fn translate(&self, failure: impl Into<Failure>, request: Option<&RequestContext>) -> AppError {
        let failure: Failure = failure.into();
        let upstream = match failure {
            Failure::App(error) => return error,
            Failure::Upstream(upstream) => upstream,
            Failure::Absent => UpstreamFailure::default(),
        };

        let classification = classify(&upstream, &self.config);
        let error = self.build(&classification, request);
        let error = record_upstream(error, &classification, &upstream);

        let status = error.http_status().as_u16();
        if error.http_status().is_server_error() {
            tracing::warn!(errno = error.errno(), status, rule = classification.rule_name(), "translated failure");
        } else {
            tracing::debug!(errno = error.errno(), status, rule = classification.rule_name(), "translated failure");
        }
        error
    }

    /// Build the error for an unclassified failure.
    pub fn unexpected_error(&self, request: Option<&RequestContext>) -> AppError {
        let request = request.filter(|_| self.config.attach_request_context);
        AppError::unexpected_error(request)
    }

    fn build(&self, classification: &Classification<'_>, request: Option<&RequestContext>) -> AppError {
        match classification {
            Classification::MissingParameter { param } => AppError::missing_request_parameter(*param),
            Classification::InvalidParameter { validation } => {
                AppError::invalid_request_parameter((*validation).clone())
            }
            Classification::BackendServiceFailure { .. } => AppError::backend_service_failure(),
            Classification::InvalidToken { .. } => AppError::invalid_token(None),
            Classification::InvalidTimestamp => AppError::invalid_timestamp(),
            Classification::InvalidNonce => AppError::invalid_nonce(),
            Classification::InvalidSignature { .. } => AppError::invalid_signature(),
            Classification::RequestBodyTooLarge => AppError::request_body_too_large(),
            Classification::Unspecified => self.unexpected_error(request),
        }
    }
}

/// Keep what the upstream said for operators, outside the client payload.
fn record_upstream(mut error: AppError, classification: &Classification<'_>, upstream: &UpstreamFailure) -> AppError {
    error = error.with_metadata("rule", classification.rule_name());
    if let Some(reason) = upstream.reason() {
        error = error.with_metadata("reason", reason.to_owned());
    }
    if let Some(payload) = upstream.payload() {
        if let Some(message) = &payload.message {
            error = error.with_metadata("upstream_message", message.clone());
        }
        if let Some(errno) = payload.errno {
            error = error.with_metadata("upstream_errno", errno.to_string());
        }
        if let Some(status) = payload.status_code {
            error = error.with_metadata("upstream_status", status.to_string());
        }
    }
    error
}

/// Translate with the default configuration.
///
/// ```rust
/// use app_errors::translate;
/// use serde_json::json;
///
/// let err = translate(
///     json!({
///         "output": { "payload": {
///             "message": "\"email\" is required",
///             "validation": { "keys": ["email"] }
///         } }
///     }),
///     None,
/// );
///
/// assert_eq!(err.errno(), 108);
/// assert_eq!(err.message(), "Missing parameter in request body: email");
/// assert_eq!(err.payload().param(), Some("email"));
/// ```
pub fn translate(failure: impl Into<Failure>, request: Option<&RequestContext>) -> AppError {
    DEFAULT_TRANSLATOR.translate(failure, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn app_error_passes_through() {
        let original = AppError::too_many_requests(60);
        let translated = translate(original.clone(), None);
        assert_eq!(translated, original);
    }

    #[test]
    fn absent_failure_is_unspecified() {
        assert_eq!(translate((), None).errno(), 999);
        assert_eq!(translate(None::<UpstreamFailure>, None).errno(), 999);
        assert_eq!(translate(json!(null), None).errno(), 999);
    }

    #[test]
    fn io_errors_become_backend_failures() {
        let err = translate(io::Error::from(io::ErrorKind::ConnectionRefused), None);
        assert_eq!(err.errno(), 203);

        let err = translate(io::Error::from(io::ErrorKind::PermissionDenied), None);
        assert_eq!(err.errno(), 999);
    }

    #[test]
    fn context_only_attached_to_unspecified() {
        let ctx = RequestContext::new().with_method("POST");
        let err = translate(json!({ "output": { "payload": { "validation": "foo" } } }), Some(&ctx));
        assert_eq!(err.errno(), 107);
        assert!(err.payload().request().is_none());

        let err = translate(json!({ "output": {} }), Some(&ctx));
        assert_eq!(err.payload().request().and_then(|r| r.method.as_deref()), Some("POST"));
    }

    #[test]
    fn context_can_be_disabled() {
        let translator = Translator::new(TranslatorConfig {
            attach_request_context: false,
            ..TranslatorConfig::default()
        })
        .unwrap();
        let ctx = RequestContext::new().with_path("/v1/account");
        let err = translator.translate(json!({}), Some(&ctx));
        assert_eq!(err.errno(), 999);
        assert!(err.payload().request().is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TranslatorConfig {
            required_marker: String::new(),
            ..TranslatorConfig::default()
        };
        assert!(matches!(Translator::new(config), Err(ConfigError::EmptyRequiredMarker)));
    }

    #[test]
    fn upstream_details_go_to_internal_log_only() {
        let err = translate(
            json!({
                "output": { "payload": { "statusCode": 401, "message": "Unknown credentials" } }
            }),
            None,
        );
        assert_eq!(err.errno(), 110);

        let log = err.internal_log();
        assert_eq!(log.get("rule"), Some("invalid_token"));
        assert_eq!(log.get("upstream_message"), Some("Unknown credentials"));
        assert_eq!(log.get("upstream_status"), Some("401"));

        let body = serde_json::to_string(err.payload()).unwrap();
        assert!(!body.contains("Unknown credentials"));
    }
}
