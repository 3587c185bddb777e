//! Translator settings.
//!
//! The defaults match the validation library and HTTP client the service
//! ships with. Deployments that swap either one can load different markers
//! from their own configuration file:
//!
//! ```rust
//! use app_errors::{Translator, TranslatorConfig};
//! use serde_json::json;
//!
//! let config: TranslatorConfig = serde_json::from_value(json!({
//!     "transientReasons": ["socket hang up", "ECONNREFUSED", "ETIMEDOUT"],
//!     "attachRequestContext": false
//! }))
//! .unwrap();
//!
//! let translator = Translator::new(config).unwrap();
//! assert_eq!(translator.config().required_marker, "is required");
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Message fragment the validation library uses for a missing required key.
pub const DEFAULT_REQUIRED_MARKER: &str = "is required";

/// Reason fragments that identify a dropped or refused backend connection.
pub const DEFAULT_TRANSIENT_REASONS: [&str; 3] = ["socket hang up", "ECONNREFUSED", "ECONNRESET"];

/// Settings for a [`Translator`](crate::Translator).
///
/// Missing keys take their default, so a partial file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslatorConfig {
    /// Substring of the upstream validation message marking a missing field.
    pub required_marker: String,
    /// Substrings of a failure's `reason` that mean a backend was unreachable.
    pub transient_reasons: Vec<String>,
    /// Attach the request summary to unspecified errors.
    pub attach_request_context: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            required_marker: DEFAULT_REQUIRED_MARKER.to_owned(),
            transient_reasons: DEFAULT_TRANSIENT_REASONS.iter().map(|r| (*r).to_owned()).collect(),
            attach_request_context: true,
        }
    }
}

impl TranslatorConfig {
    /// Reject settings that would make a rule match everything.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty required marker or an empty
    /// transient reason.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_marker.trim().is_empty() {
            return Err(ConfigError::EmptyRequiredMarker);
        }
        if let Some(index) = self.transient_reasons.iter().position(|r| r.trim().is_empty()) {
            return Err(ConfigError::EmptyTransientReason { index });
        }
        Ok(())
    }

    /// Whether `reason` contains any configured transient fragment.
    pub fn is_transient_reason(&self, reason: &str) -> bool {
        self.transient_reasons.iter().any(|pattern| reason.contains(pattern.as_str()))
    }
}

/// Invalid translator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The missing-field marker is blank and would match every message.
    #[error("required marker must not be empty")]
    EmptyRequiredMarker,

    /// A transient reason pattern is blank and would match every reason.
    #[error("transient reason at index {index} must not be empty")]
    EmptyTransientReason {
        /// Position in `transient_reasons`
        index: usize,
    },
}
