//! Internal diagnostics for operators.
//!
//! Upstream reason strings, upstream messages and foreign errnos are useful
//! when debugging a backend outage, and must never reach a client. They are
//! stored on the [`AppError`](crate::AppError) as zeroized metadata and only
//! come back out through [`InternalLog`], which borrows from the error and
//! cannot outlive it.

use crate::Errno;
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Metadata value wrapper with zeroization for owned data.
///
/// Borrowed values are assumed static and are not zeroized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextField {
    value: Cow<'static, str>,
}

impl ContextField {
    /// Borrow the value.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.value.as_ref()
    }
}

impl From<&'static str> for ContextField {
    fn from(value: &'static str) -> Self {
        Self {
            value: Cow::Borrowed(value),
        }
    }
}

impl From<String> for ContextField {
    fn from(value: String) -> Self {
        Self {
            value: Cow::Owned(value),
        }
    }
}

impl From<Cow<'static, str>> for ContextField {
    fn from(value: Cow<'static, str>) -> Self {
        Self { value }
    }
}

impl Zeroize for ContextField {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for ContextField {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Structured log entry borrowed from an [`AppError`](crate::AppError).
///
/// ```rust
/// use app_errors::{translate, UpstreamFailure};
///
/// let failure = UpstreamFailure::with_reason("connect ECONNREFUSED 10.0.0.7:8080");
/// let err = translate(failure, None);
///
/// let mut line = String::new();
/// err.internal_log().write_to(&mut line).unwrap();
/// assert!(line.contains("ECONNREFUSED 10.0.0.7"));
/// assert!(!err.to_string().contains("10.0.0.7"));
/// ```
#[derive(Debug)]
#[allow(missing_docs)]
pub struct InternalLog<'a> {
    pub errno: &'static Errno,
    pub message: &'a str,
    pub metadata: &'a [(&'static str, ContextField)],
}

impl<'a> InternalLog<'a> {
    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Requires both the `trusted_debug` feature and debug assertions, so a
    /// release build cannot materialize upstream internals into a `String`
    /// by accident.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut output);
        output
    }

    /// Write the entry to any `fmt::Write` sink, truncating each field.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] status={} kind='{}' message='{}'",
            self.errno,
            self.errno.status().as_u16(),
            self.errno.kind(),
            truncate_with_indicator(self.message)
        )?;

        for (key, value) in self.metadata {
            write!(f, " {}='{}'", key, truncate_with_indicator(value.as_str()))?;
        }

        Ok(())
    }

    /// Emit the entry as a `tracing` event.
    ///
    /// Server-side failures go out at `error`, everything else at `debug`.
    pub fn emit(&self) {
        let mut line = String::new();
        if self.write_to(&mut line).is_err() {
            return;
        }
        let errno = self.errno.code();
        let status = self.errno.status().as_u16();
        if self.errno.status().is_server_error() {
            tracing::error!(errno, status, "{line}");
        } else {
            tracing::debug!(errno, status, "{line}");
        }
    }

    /// The errno being logged.
    #[inline]
    pub const fn errno(&self) -> &'static Errno {
        self.errno
    }

    /// Client-facing message of the error.
    #[inline]
    pub const fn message(&self) -> &str {
        self.message
    }

    /// All metadata, in insertion order.
    #[inline]
    pub const fn metadata(&self) -> &[(&'static str, ContextField)] {
        self.metadata
    }

    /// First metadata value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Truncate a string for display so one huge upstream message cannot flood
/// the log pipeline.
///
/// Returns a Cow<str> to avoid allocation when no truncation is needed.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
