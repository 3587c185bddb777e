//! Errno namespace - the stable identifiers clients key their handling on.
//!
//! An [`Errno`] binds one numeric code to exactly one HTTP status, one reason
//! phrase, one base message and one [`ErrorKind`]. The binding is frozen at
//! compile time: every errno is a `static` produced by [`define_errnos!`], and
//! nothing in the crate builds one at runtime.
//!
//! # Numbering
//!
//! - **1xx**: the client sent something we refuse (bad input, bad signature,
//!   too many requests)
//! - **2xx**: a service we depend on misbehaved
//! - **999**: anything we could not classify
//!
//! Ranges are checked by the tests in `definitions`.
//!
//! # Example
//!
//! ```rust
//! use app_errors::{define_errnos, Errno, ErrorKind};
//!
//! define_errnos! {
//!     ErrorKind::ClientInput => {
//!         UNSUPPORTED_LOCALE = (150, BAD_REQUEST, "Unsupported locale"),
//!     }
//! }
//!
//! fn describe(errno: &Errno) -> String {
//!     format!("{errno}: {}", errno.message())
//! }
//!
//! assert_eq!(describe(&UNSUPPORTED_LOCALE), "errno 150: Unsupported locale");
//! ```

use http::StatusCode;
use std::fmt;

// ============================================================================
// Error Kind
// ============================================================================

/// Broad failure family an errno belongs to.
///
/// Callers use this to pick retry behaviour and log severity without matching
/// on individual errnos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request body or parameters were rejected (400-class).
    ClientInput,
    /// The request signature or token was rejected (401).
    Authentication,
    /// The client exceeded its request budget (429).
    RateLimit,
    /// A backend the service depends on failed (500-class).
    UpstreamFailure,
    /// Catch-all for failures nothing else recognised.
    Unspecified,
}

impl ErrorKind {
    /// Static label for logs and dashboards.
    #[inline]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::ClientInput => "Client Input",
            Self::Authentication => "Authentication",
            Self::RateLimit => "Rate Limit",
            Self::UpstreamFailure => "Upstream Failure",
            Self::Unspecified => "Unspecified",
        }
    }

    /// Whether the client can reasonably try the same request again later.
    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit | Self::UpstreamFailure)
    }

    /// Whether a status code belongs to this kind's class.
    ///
    /// Used by the registry tests to catch an errno wired to the wrong status.
    pub fn permits_status(&self, status: StatusCode) -> bool {
        match self {
            Self::ClientInput => status.is_client_error(),
            Self::Authentication => status == StatusCode::UNAUTHORIZED,
            Self::RateLimit => status == StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamFailure | Self::Unspecified => status.is_server_error(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Errno (Primary Identity Type)
// ============================================================================

/// A stable failure identifier with its HTTP mapping.
///
/// Errnos are identities, not values: they are defined once as statics and
/// always handled by reference, so the type is neither `Copy` nor `Clone`.
///
/// # Example
///
/// ```rust
/// use app_errors::{definitions, StatusCode};
///
/// let errno = &definitions::TOO_MANY_REQUESTS;
/// assert_eq!(errno.code(), 114);
/// assert_eq!(errno.status(), StatusCode::TOO_MANY_REQUESTS);
/// assert_eq!(errno.reason_phrase(), "Too Many Requests");
/// ```
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Errno {
    code: u16,
    kind: ErrorKind,
    status: StatusCode,
    message: &'static str,
}

impl Errno {
    /// Create an errno in a const context.
    ///
    /// # Panics
    ///
    /// Panics (at compile time, for statics) if `code` is 0 or above 999, or if
    /// `message` is empty.
    #[inline]
    pub const fn const_new(
        code: u16,
        kind: ErrorKind,
        status: StatusCode,
        message: &'static str,
    ) -> Self {
        assert!(code > 0 && code < 1000, "Errno must be 001-999");
        assert!(!message.is_empty(), "Errno message must not be empty");

        Self {
            code,
            kind,
            status,
            message,
        }
    }

    /// Numeric code reported to clients as `errno`.
    #[inline]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Failure family.
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status the errno is always returned with.
    #[inline]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Base message, before any parameter name is appended.
    #[inline]
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// Reason phrase for the payload's `error` field, e.g. `"Bad Request"`.
    #[inline]
    pub fn reason_phrase(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Error")
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "errno {}", self.code)
    }
}

/// Define one or more errnos of the same kind as `pub static` items.
///
/// Each entry is `NAME = (code, STATUS_CONST, "message")`, where
/// `STATUS_CONST` names an associated constant of [`http::StatusCode`].
///
/// ```rust
/// # use app_errors::{define_errnos, ErrorKind};
/// define_errnos! {
///     ErrorKind::UpstreamFailure => {
///         MAILER_UNAVAILABLE = (204, SERVICE_UNAVAILABLE, "Mail service unavailable"),
///     }
/// }
/// assert_eq!(MAILER_UNAVAILABLE.status().as_u16(), 503);
/// ```
#[macro_export]
macro_rules! define_errnos {
    ($kind:expr => { $( $name:ident = ($code:expr, $status:ident, $message:expr) ),+ $(,)? }) => {
        $(
            #[allow(missing_docs)]
            pub static $name: $crate::Errno = $crate::Errno::const_new(
                $code,
                $kind,
                $crate::StatusCode::$status,
                $message,
            );
        )+
    };
}

// ============================================================================
// Tests
// ============================================================================
