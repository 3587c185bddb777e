//! The errno registry.
//!
//! Every errno the service can return lives here. Clients branch on these
//! numbers, so a published code never changes meaning, status or message.
//!
//! | errno | status | meaning |
//! |-------|--------|---------|
//! | 107 | 400 | invalid parameter in request body |
//! | 108 | 400 | missing parameter in request body |
//! | 109 | 401 | invalid request signature |
//! | 110 | 401 | invalid authentication token |
//! | 111 | 401 | stale timestamp in request signature |
//! | 113 | 413 | request body too large |
//! | 114 | 429 | client sent too many requests |
//! | 115 | 401 | invalid nonce in request signature |
//! | 203 | 500 | a backend service request failed |
//! | 999 | 500 | unspecified error |
//!
//! Anything not listed falls back to [`UNEXPECTED_ERROR`].

use crate::{define_errnos, Errno, ErrorKind};

/// Errno range constants. Checked for consistency in `tests`.
#[allow(missing_docs)]
pub mod ranges {
    pub const CLIENT_START: u16 = 100;  pub const CLIENT_END: u16 = 199;
    pub const SERVICE_START: u16 = 200; pub const SERVICE_END: u16 = 299;
    pub const UNEXPECTED: u16 = 999;
}

// -----------------------------------------------------------------------------
// Client input (1xx, 400-class)
// -----------------------------------------------------------------------------
define_errnos! {
    ErrorKind::ClientInput => {
        INVALID_PARAMETER  = (107, BAD_REQUEST, "Invalid parameter in request body"),
        MISSING_PARAMETER  = (108, BAD_REQUEST, "Missing parameter in request body"),
        REQUEST_TOO_LARGE  = (113, PAYLOAD_TOO_LARGE, "Request body too large"),
    }
}

// -----------------------------------------------------------------------------
// Request signing (1xx, 401)
// -----------------------------------------------------------------------------
define_errnos! {
    ErrorKind::Authentication => {
        INVALID_REQUEST_SIGNATURE = (109, UNAUTHORIZED, "Invalid request signature"),
        INVALID_TOKEN             = (110, UNAUTHORIZED, "Invalid authentication token in request signature"),
        INVALID_TIMESTAMP         = (111, UNAUTHORIZED, "Invalid timestamp in request signature"),
        INVALID_NONCE             = (115, UNAUTHORIZED, "Invalid nonce in request signature"),
    }
}

// -----------------------------------------------------------------------------
// Throttling (1xx, 429)
// -----------------------------------------------------------------------------
define_errnos! {
    ErrorKind::RateLimit => {
        TOO_MANY_REQUESTS = (114, TOO_MANY_REQUESTS, "Client has sent too many requests"),
    }
}

// -----------------------------------------------------------------------------
// Backend services (2xx, 500-class)
// -----------------------------------------------------------------------------
define_errnos! {
    ErrorKind::UpstreamFailure => {
        BACKEND_SERVICE_FAILURE = (203, INTERNAL_SERVER_ERROR, "A backend service request failed."),
    }
}

// -----------------------------------------------------------------------------
// Catch-all (999)
// -----------------------------------------------------------------------------
define_errnos! {
    ErrorKind::Unspecified => {
        UNEXPECTED_ERROR = (999, INTERNAL_SERVER_ERROR, "Unspecified error"),
    }
}

/// Every registered errno, ordered by code.
pub static ALL: [&Errno; 10] = [
    &INVALID_PARAMETER,
    &MISSING_PARAMETER,
    &INVALID_REQUEST_SIGNATURE,
    &INVALID_TOKEN,
    &INVALID_TIMESTAMP,
    &REQUEST_TOO_LARGE,
    &TOO_MANY_REQUESTS,
    &INVALID_NONCE,
    &BACKEND_SERVICE_FAILURE,
    &UNEXPECTED_ERROR,
];

/// Find a registered errno by its numeric code.
pub fn lookup(code: u16) -> Option<&'static Errno> {
    ALL.iter().copied().find(|errno| errno.code() == code)
}

/// Like [`lookup`], but total: unknown codes resolve to [`UNEXPECTED_ERROR`].
pub fn resolve(code: u16) -> &'static Errno {
    lookup(code).unwrap_or(&UNEXPECTED_ERROR)
}
