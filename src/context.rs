//! Request snapshot attached to unspecified errors.
//!
//! When a failure cannot be classified, operators want to know which request
//! triggered it. The caller hands over a [`RequestContext`] whose values are
//! already resolved (locale detection, geo lookup and user-agent parsing
//! happen upstream). The error keeps a fixed whitelist of those values as a
//! [`RequestSummary`]; anything else on the context is ignored.
//!
//! # Whitelist
//!
//! | summary field    | source                  |
//! |------------------|-------------------------|
//! | `acceptLanguage` | `app.acceptLanguage`    |
//! | `locale`         | `app.locale`            |
//! | `geo`            | `app.geo`               |
//! | `userAgent`      | `app.ua`                |
//! | `method`         | `method`                |
//! | `path`           | `path`                  |
//! | `query`          | `query`                 |
//! | `payload`        | `payload`               |
//! | `headers`        | `headers`               |

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Values derived from the request by the application layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct AppContext {
    pub accept_language: Option<String>,
    pub locale: Option<String>,
    pub geo: Option<Value>,
    /// Parsed user agent. Exposed as `userAgent` in the summary.
    pub ua: Option<Value>,
}

/// Already-resolved request metadata.
///
/// Can be built field by field or deserialized from the JSON snapshot a
/// request handler keeps:
///
/// ```rust
/// use app_errors::RequestContext;
/// use serde_json::json;
///
/// let ctx: RequestContext = serde_json::from_value(json!({
///     "app": { "acceptLanguage": "en, fr", "locale": "en" },
///     "method": "GET",
///     "path": "/v1/account/status",
/// }))
/// .unwrap();
///
/// assert_eq!(ctx.app.locale.as_deref(), Some("en"));
/// assert_eq!(ctx.method.as_deref(), Some("GET"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct RequestContext {
    pub app: AppContext,
    pub method: Option<String>,
    pub path: Option<String>,
    pub query: Option<Value>,
    pub payload: Option<Value>,
    pub headers: Option<Value>,
}

#[allow(missing_docs)]
impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_headers(mut self, headers: Value) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_app(mut self, app: AppContext) -> Self {
        self.app = app;
        self
    }

    /// Copy the whitelisted fields into a summary.
    pub fn summarize(&self) -> RequestSummary {
        RequestSummary {
            accept_language: self.app.accept_language.clone(),
            locale: self.app.locale.clone(),
            geo: self.app.geo.clone(),
            user_agent: self.app.ua.clone(),
            method: self.method.clone(),
            path: self.path.clone(),
            query: self.query.clone(),
            payload: self.payload.clone(),
            headers: self.headers.clone(),
        }
    }
}

/// The `request` object inside an unspecified error's payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct RequestSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
}

impl From<&RequestContext> for RequestSummary {
    fn from(ctx: &RequestContext) -> Self {
        ctx.summarize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_renames_ua() {
        let ctx = RequestContext::new().with_app(AppContext {
            ua: Some(json!({ "os": "Android", "osVersion": "9" })),
            ..AppContext::default()
        });

        let value = serde_json::to_value(ctx.summarize()).unwrap();
        assert_eq!(value, json!({ "userAgent": { "os": "Android", "osVersion": "9" } }));
    }

    #[test]
    fn unknown_context_fields_are_ignored() {
        let ctx: RequestContext = serde_json::from_value(json!({
            "app": {
                "locale": "de",
                "devices": [{ "id": 1 }],
                "metricsContext": { "service": "sync" }
            },
            "method": "POST",
            "auth": { "credentials": "secret" }
        }))
        .unwrap();

        let value = serde_json::to_value(ctx.summarize()).unwrap();
        assert_eq!(value, json!({ "locale": "de", "method": "POST" }));
    }

    #[test]
    fn empty_context_summarizes_to_empty_object() {
        let value = serde_json::to_value(RequestSummary::from(&RequestContext::new())).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn builder_sets_request_line() {
        let ctx = RequestContext::new()
            .with_method("GET")
            .with_path("/v1/wibble")
            .with_query(json!({ "foo": "bar" }))
            .with_payload(json!({ "baz": "qux" }))
            .with_headers(json!({ "wibble": "blee" }));

        let summary = ctx.summarize();
        assert_eq!(summary.method.as_deref(), Some("GET"));
        assert_eq!(summary.path.as_deref(), Some("/v1/wibble"));
        assert_eq!(summary.headers, Some(json!({ "wibble": "blee" })));
    }
}
