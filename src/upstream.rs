//! Typed model of the failures handed to the translator.
//!
//! The framework and validation library report failures as loosely shaped
//! objects:
//!
//! ```json
//! { "output": { "payload": { "message": "...", "validation": { "keys": ["email"] },
//!                            "errno": 999, "statusCode": 500, "error": "..." } },
//!   "reason": "socket hang up" }
//! ```
//!
//! Every level is optional and a field of the wrong type is read as absent,
//! so building an [`UpstreamFailure`] never fails.

use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};
use std::io;

/// Top-level failure: an optional framework `output` plus an optional
/// low-level `reason` string.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpstreamFailure {
    /// Framework response wrapper.
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub output: Option<UpstreamOutput>,
    /// Low-level cause, e.g. `"socket hang up"`.
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub reason: Option<String>,
}

/// The `output` wrapper around the framework payload.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpstreamOutput {
    #[allow(missing_docs)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub payload: Option<UpstreamPayload>,
}

/// The framework's response payload for the failure.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct UpstreamPayload {
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub message: Option<String>,
    /// Validation details. Either the missing-field shape `{ "keys": [...] }`
    /// or anything else the validator produced.
    pub validation: Option<Value>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub errno: Option<u64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub status_code: Option<u16>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub error: Option<String>,
}

impl UpstreamFailure {
    /// Read a failure out of arbitrary JSON. Non-object input yields an
    /// empty failure.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// A failure that only carries a low-level reason.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            output: None,
            reason: Some(reason.into()),
        }
    }

    /// A failure that only carries a framework payload.
    pub fn with_payload(payload: UpstreamPayload) -> Self {
        Self {
            output: Some(UpstreamOutput {
                payload: Some(payload),
            }),
            reason: None,
        }
    }

    /// The nested payload, if both levels are present.
    pub fn payload(&self) -> Option<&UpstreamPayload> {
        self.output.as_ref().and_then(|output| output.payload.as_ref())
    }

    /// The low-level reason, if one was reported.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl UpstreamPayload {
    /// Validation field names, when `validation` has the `{ "keys": [...] }`
    /// shape. Non-string entries are skipped.
    pub fn validation_keys(&self) -> impl Iterator<Item = &str> {
        self.validation
            .as_ref()
            .and_then(|v| v.get("keys"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

impl From<Value> for UpstreamFailure {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl From<&Value> for UpstreamFailure {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

impl From<&io::Error> for UpstreamFailure {
    /// Network failures from Rust clients surface as `io::Error`; give them
    /// the same reason labels a socket layer would report.
    fn from(error: &io::Error) -> Self {
        Self::with_reason(io_error_kind_label(error.kind()))
    }
}

impl From<io::Error> for UpstreamFailure {
    fn from(error: io::Error) -> Self {
        Self::from(&error)
    }
}

/// Socket-style label for an io error kind.
#[inline]
pub const fn io_error_kind_label(kind: io::ErrorKind) -> &'static str {
    match kind {
        io::ErrorKind::ConnectionRefused => "ECONNREFUSED",
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => "ECONNRESET",
        io::ErrorKind::UnexpectedEof => "socket hang up",
        io::ErrorKind::TimedOut => "ETIMEDOUT",
        io::ErrorKind::HostUnreachable => "EHOSTUNREACH",
        io::ErrorKind::NetworkUnreachable => "ENETUNREACH",
        io::ErrorKind::NotConnected => "ENOTCONN",
        io::ErrorKind::AddrInUse => "EADDRINUSE",
        io::ErrorKind::AddrNotAvailable => "EADDRNOTAVAIL",
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::PermissionDenied => "EACCES",
        io::ErrorKind::WouldBlock => "EAGAIN",
        io::ErrorKind::Interrupted => "EINTR",
        _ => "EIO",
    }
}
