//! Client-facing data: the JSON payload and the throttling options.

use crate::{Errno, RequestSummary};
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Payload
// ============================================================================

/// JSON body returned to the client.
///
/// Always carries `code`, `error`, `errno` and `message`; the remaining
/// fields appear only for the errno that owns them. Fields are private so the
/// payload cannot drift from the [`AppError`](crate::AppError) it belongs to.
///
/// ```json
/// { "code": 400, "error": "Bad Request", "errno": 108,
///   "message": "Missing parameter in request body: email", "param": "email" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    code: u16,
    error: &'static str,
    errno: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_localized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<RequestSummary>,
}

impl ErrorPayload {
    pub(crate) fn new(errno: &Errno, message: &str) -> Self {
        Self {
            code: errno.status().as_u16(),
            error: errno.reason_phrase(),
            errno: errno.code(),
            message: message.to_owned(),
            param: None,
            validation: None,
            retry_after: None,
            retry_after_localized: None,
            description: None,
            request: None,
        }
    }

    pub(crate) fn with_param(mut self, name: String) -> Self {
        self.param = Some(name);
        self
    }

    pub(crate) fn with_validation(mut self, value: Value) -> Self {
        self.validation = Some(value).filter(|v| !v.is_null());
        self
    }

    pub(crate) fn with_retry_after(mut self, retry: RetryAfter) -> Self {
        self.retry_after = Some(retry.seconds);
        self.retry_after_localized = retry.localized;
        self
    }

    pub(crate) fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    pub(crate) fn with_request(mut self, request: Option<RequestSummary>) -> Self {
        self.request = request;
        self
    }

    /// Numeric HTTP status.
    #[inline]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// HTTP reason phrase, e.g. `"Internal Server Error"`.
    #[inline]
    pub const fn error(&self) -> &'static str {
        self.error
    }

    /// Same as [`AppError::errno`](crate::AppError::errno).
    #[inline]
    pub const fn errno(&self) -> u16 {
        self.errno
    }

    /// Same as [`AppError::message`](crate::AppError::message).
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Offending field name (errno 108).
    #[inline]
    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// Validation details as reported upstream (errno 107).
    #[inline]
    pub const fn validation(&self) -> Option<&Value> {
        self.validation.as_ref()
    }

    /// Seconds until the client may retry (errno 114).
    #[inline]
    pub const fn retry_after(&self) -> Option<u64> {
        self.retry_after
    }

    /// Human-readable retry hint (errno 114).
    #[inline]
    pub fn retry_after_localized(&self) -> Option<&str> {
        self.retry_after_localized.as_deref()
    }

    /// Extra client-facing detail (errno 110).
    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Request snapshot attached to unspecified errors.
    #[inline]
    pub const fn request(&self) -> Option<&RequestSummary> {
        self.request.as_ref()
    }

    /// Render as a `serde_json::Value`.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

// ============================================================================
// Retry-After options
// ============================================================================

/// When a throttled client may come back.
///
/// A bare number of seconds converts directly, so both of these work:
///
/// ```rust
/// use app_errors::{AppError, RetryAfter};
///
/// let plain = AppError::too_many_requests(900);
/// let friendly = AppError::too_many_requests(RetryAfter::seconds(900).localized("in 15 minutes"));
///
/// assert_eq!(plain.payload().retry_after_localized(), None);
/// assert_eq!(friendly.payload().retry_after_localized(), Some("in 15 minutes"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryAfter {
    seconds: u64,
    localized: Option<String>,
}

impl RetryAfter {
    /// Retry after `seconds`, with no localized text.
    pub const fn seconds(seconds: u64) -> Self {
        Self {
            seconds,
            localized: None,
        }
    }

    /// Attach a human-readable form such as `"in 15 minutes"`.
    ///
    /// An empty string is treated as not supplied.
    pub fn localized(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.localized = (!text.is_empty()).then_some(text);
        self
    }

    /// Seconds until retry.
    #[inline]
    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    /// The localized text, if any.
    #[inline]
    pub fn localized_text(&self) -> Option<&str> {
        self.localized.as_deref()
    }
}

impl From<u64> for RetryAfter {
    fn from(seconds: u64) -> Self {
        Self::seconds(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;
    use serde_json::json;

    #[test]
    fn base_payload_mirrors_errno() {
        let payload = ErrorPayload::new(&definitions::INVALID_PARAMETER, "Invalid parameter in request body");
        assert_eq!(
            payload.to_value().unwrap(),
            json!({
                "code": 400,
                "error": "Bad Request",
                "errno": 107,
                "message": "Invalid parameter in request body",
            })
        );
    }

    #[test]
    fn optional_fields_serialize_camel_case() {
        let payload = ErrorPayload::new(&definitions::TOO_MANY_REQUESTS, "Client has sent too many requests")
            .with_retry_after(RetryAfter::seconds(30).localized("in 30 seconds"));
        let value = payload.to_value().unwrap();
        assert_eq!(value["retryAfter"], json!(30));
        assert_eq!(value["retryAfterLocalized"], json!("in 30 seconds"));
        assert!(value.get("request").is_none());
        assert!(value.get("param").is_none());
    }

    #[test]
    fn null_validation_is_omitted() {
        let payload = ErrorPayload::new(&definitions::INVALID_PARAMETER, "x").with_validation(Value::Null);
        assert_eq!(payload.validation(), None);
    }

    #[test]
    fn empty_localized_text_is_dropped() {
        let retry = RetryAfter::seconds(5).localized("");
        assert_eq!(retry.localized_text(), None);
        assert_eq!(retry.as_secs(), 5);
        assert_eq!(RetryAfter::from(5), retry);
    }
}
