//! # App Errors
//!
//! Error normalization for HTTP services.
//!
//! Route handlers fail in many ways: the schema validator rejects a body, a
//! backend drops the connection, some library returns an error nobody
//! anticipated. Clients should see none of that variety. They get one JSON
//! shape with a stable `errno` they can branch on:
//!
//! ```json
//! { "code": 400, "error": "Bad Request", "errno": 108,
//!   "message": "Missing parameter in request body: email", "param": "email" }
//! ```
//!
//! ## Design Principles
//!
//! 1. **Errnos are frozen identities**: each maps to exactly one status,
//!    reason phrase and message (see [`definitions`])
//! 2. **Translation is total**: [`translate`] never fails; unrecognised input
//!    becomes errno 999
//! 3. **Upstream internals stay internal**: reason strings and foreign
//!    messages are kept as zeroized metadata for [`AppError::internal_log`]
//!    and never enter the payload
//! 4. **The payload cannot drift**: `payload.errno` and `payload.message`
//!    always equal the error's own
//!
//! ## Quick Start
//!
//! ```rust
//! use app_errors::{translate, AppError, RequestContext};
//! use serde_json::json;
//!
//! fn handle(result: Result<(), serde_json::Value>, ctx: &RequestContext) -> Result<(), AppError> {
//!     result.map_err(|failure| translate(failure, Some(ctx)))
//! }
//!
//! let ctx = RequestContext::new().with_method("POST").with_path("/v1/account/create");
//! let failure = json!({ "output": { "payload": {} }, "reason": "connect ECONNREFUSED" });
//!
//! let err = handle(Err(failure), &ctx).unwrap_err();
//! assert_eq!(err.errno(), 203);
//! assert_eq!(err.http_status().as_u16(), 500);
//! assert_eq!(err.message(), "A backend service request failed.");
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: enables [`InternalLog::format_for_trusted_debug`] in
//!   debug builds

#![warn(missing_docs)]
#![warn(clippy::all)]

use http::header::{self, HeaderValue};
use serde::{Serialize, Serializer};
use serde_json::Value;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

pub mod classify;
pub mod codes;
pub mod config;
pub mod context;
pub mod definitions;
pub mod logging;
pub mod models;
pub mod translate;
pub mod upstream;

pub use classify::*;
pub use codes::*;
pub use config::*;
pub use context::*;
pub use logging::*;
pub use models::*;
pub use translate::*;
pub use upstream::*;

pub use http::StatusCode;

/// Type alias for Results using our error type.
pub type Result<T> = std::result::Result<T, AppError>;

// ============================================================================
// Internal Error Context
// ============================================================================

/// Operator-only diagnostics attached to an `AppError`.
#[derive(Clone, PartialEq, Default)]
struct ErrorContext {
    metadata: SmallVec<[(&'static str, ContextField); 4]>,
}

impl Zeroize for ErrorContext {
    fn zeroize(&mut self) {
        for (_, value) in &mut self.metadata {
            value.zeroize();
        }
        self.metadata.clear();
    }
}

impl Drop for ErrorContext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// AppError
// ============================================================================

/// The canonical error returned to clients.
///
/// Construct one through [`translate`] or a named constructor. Once built it
/// is immutable apart from internal metadata, which never reaches the
/// payload.
///
/// `AppError` implements [`std::error::Error`], serializes as its payload and
/// renders into an [`http::Response`] with [`AppError::to_response`].
#[must_use = "errors should be returned to the client or logged"]
#[derive(Clone, PartialEq)]
pub struct AppError {
    errno: &'static Errno,
    message: String,
    payload: ErrorPayload,
    context: ErrorContext,
}

impl AppError {
    fn new(errno: &'static Errno, message: String, payload: ErrorPayload) -> Self {
        Self {
            errno,
            message,
            payload,
            context: ErrorContext::default(),
        }
    }

    /// An error carrying the errno's own message and no extra fields.
    fn plain(errno: &'static Errno) -> Self {
        Self::new(errno, errno.message().to_owned(), ErrorPayload::new(errno, errno.message()))
    }

    /// Translate any failure with the default configuration.
    ///
    /// Same as the free function [`translate`](crate::translate::translate).
    pub fn translate(failure: impl Into<Failure>, request: Option<&RequestContext>) -> Self {
        crate::translate::translate(failure, request)
    }

    // Named constructors. Each one is the only place its errno's extra
    // payload fields are filled in.

    /// errno 107: the request body failed validation.
    ///
    /// `validation` is echoed to the client verbatim.
    pub fn invalid_request_parameter(validation: impl Into<Value>) -> Self {
        let errno = &definitions::INVALID_PARAMETER;
        let payload = ErrorPayload::new(errno, errno.message()).with_validation(validation.into());
        Self::new(errno, errno.message().to_owned(), payload)
    }

    /// errno 108: a required field was absent.
    ///
    /// ```rust
    /// let err = app_errors::AppError::missing_request_parameter("email");
    /// assert_eq!(err.message(), "Missing parameter in request body: email");
    /// assert_eq!(err.payload().param(), Some("email"));
    /// ```
    pub fn missing_request_parameter(name: impl Into<String>) -> Self {
        let errno = &definitions::MISSING_PARAMETER;
        let name = name.into();
        let message = format!("{}: {}", errno.message(), name);
        let payload = ErrorPayload::new(errno, &message).with_param(name);
        Self::new(errno, message, payload)
    }

    /// errno 114: the client is throttled.
    pub fn too_many_requests(retry_after: impl Into<RetryAfter>) -> Self {
        let errno = &definitions::TOO_MANY_REQUESTS;
        let payload = ErrorPayload::new(errno, errno.message()).with_retry_after(retry_after.into());
        Self::new(errno, errno.message().to_owned(), payload)
    }

    /// errno 999: nothing more specific is known.
    ///
    /// With a request context the payload gains a `request` summary; without
    /// one the key is absent.
    pub fn unexpected_error(request: Option<&RequestContext>) -> Self {
        let errno = &definitions::UNEXPECTED_ERROR;
        let payload = ErrorPayload::new(errno, errno.message()).with_request(request.map(RequestContext::summarize));
        Self::new(errno, errno.message().to_owned(), payload)
    }

    /// errno 203: a backend dropped or refused the connection.
    pub fn backend_service_failure() -> Self {
        Self::plain(&definitions::BACKEND_SERVICE_FAILURE)
    }

    /// errno 109
    pub fn invalid_signature() -> Self {
        Self::plain(&definitions::INVALID_REQUEST_SIGNATURE)
    }

    /// errno 110, with an optional client-facing description.
    pub fn invalid_token(description: Option<String>) -> Self {
        let errno = &definitions::INVALID_TOKEN;
        let payload = ErrorPayload::new(errno, errno.message()).with_description(description);
        Self::new(errno, errno.message().to_owned(), payload)
    }

    /// errno 111
    pub fn invalid_timestamp() -> Self {
        Self::plain(&definitions::INVALID_TIMESTAMP)
    }

    /// errno 115
    pub fn invalid_nonce() -> Self {
        Self::plain(&definitions::INVALID_NONCE)
    }

    /// errno 113
    pub fn request_body_too_large() -> Self {
        Self::plain(&definitions::REQUEST_TOO_LARGE)
    }

    /// Attach operator-only metadata (upstream reason, correlation IDs...).
    ///
    /// Metadata is zeroized when the error drops and never appears in the
    /// payload or `Display` output.
    #[inline]
    pub fn with_metadata(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.context.metadata.push((key, ContextField::from(value.into())));
        self
    }

    /// Numeric errno reported to the client.
    #[inline]
    pub const fn errno(&self) -> u16 {
        self.errno.code()
    }

    /// The registry entry behind this error.
    #[inline]
    pub const fn definition(&self) -> &'static Errno {
        self.errno
    }

    /// Failure family of the errno.
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.errno.kind()
    }

    /// HTTP status for the response.
    #[inline]
    pub const fn http_status(&self) -> StatusCode {
        self.errno.status()
    }

    /// Client-facing message. Equals `payload().message()`.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Client-facing JSON body.
    #[inline]
    pub const fn payload(&self) -> &ErrorPayload {
        &self.payload
    }

    /// Whether retrying the same request later may succeed.
    #[inline]
    pub const fn is_transient(&self) -> bool {
        self.errno.kind().is_transient()
    }

    /// Structured internal log entry borrowing from this error.
    #[inline]
    pub fn internal_log(&self) -> InternalLog<'_> {
        InternalLog {
            errno: self.errno,
            message: &self.message,
            metadata: &self.context.metadata,
        }
    }

    /// Callback form of [`internal_log`](Self::internal_log).
    #[inline]
    pub fn with_internal_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InternalLog<'_>) -> R,
    {
        let log = self.internal_log();
        f(&log)
    }

    /// Render as an HTTP response: status, JSON body, `content-type` and,
    /// for throttling errors, `retry-after`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the payload cannot be encoded.
    pub fn to_response(&self) -> serde_json::Result<http::Response<String>> {
        let body = serde_json::to_string(&self.payload)?;
        let mut response = http::Response::new(body);
        *response.status_mut() = self.http_status();

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(seconds) = self.payload.retry_after() {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        Ok(response)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("errno", &self.errno.code())
            .field("kind", &self.errno.kind())
            .field("status", &self.errno.status())
            .field("message", &self.message)
            .field("payload", &self.payload)
            .field("context", &"<REDACTED>")
            .finish()
    }
}

impl fmt::Display for AppError {
    /// Client-safe: the message and errno, nothing from the upstream.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.errno)
    }
}

impl std::error::Error for AppError {}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}
