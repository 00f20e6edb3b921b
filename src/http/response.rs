//! Reply envelope and response serialization.
//!
//! # Responsibilities
//! - Carry a handler's result (status, body, MIME type, headers)
//! - Supply the default reply used when no handler produced one
//! - Turn a reply into an HTTP/1.1 response exactly once
//!
//! # Design Decisions
//! - `Server` header is written first so handler headers may replace it
//! - Non-empty bodies are prefixed with a single `\n`
//! - Invalid header names/values are skipped, never fatal
//! - An out-of-range status code degrades to a bare 500

use std::collections::HashMap;

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use axum::http::{HeaderName, HeaderValue, Response, StatusCode};
use hyper::ext::ReasonPhrase;

use crate::http::envelope::ApiEnvelope;

/// MIME type used when a handler does not pick one.
pub const DEFAULT_MIME_TYPE: &str = "application/json";

/// Body of the reply sent when no handler answered.
pub const NOT_FOUND_BODY: &str = r#"{"status":"not_found","data":"Needs more water!"}"#;

/// Outbound result of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Numeric HTTP status.
    pub status_code: u16,
    /// Body text; `None` writes no body and no `Content-Type`.
    pub body: Option<String>,
    /// `Content-Type` of the body.
    pub mime_type: String,
    /// Reason phrase replacing the canonical one.
    pub custom_status_text: Option<String>,
    /// Extra response headers, applied after `Server`.
    pub custom_headers: Option<HashMap<String, String>>,
}

impl Reply {
    /// A reply with the given status and no body.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            body: None,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            custom_status_text: None,
            custom_headers: None,
        }
    }

    /// A reply carrying a JSON body.
    pub fn json(status_code: u16, body: impl Into<String>) -> Self {
        Self::new(status_code).with_body(body)
    }

    /// A 200 reply whose body is `{"status": status, "data": data}`.
    pub fn envelope<T: serde::Serialize>(
        status: &str,
        data: Option<T>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::json(200, ApiEnvelope::new(status, data).to_json()?))
    }

    /// The reply used for unmatched requests and failed handlers.
    ///
    /// Status is 200, not 404; existing clients rely on it.
    pub fn not_found() -> Self {
        Self::json(200, NOT_FOUND_BODY)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.custom_status_text = Some(text.into());
        self
    }

    /// Add or replace a custom header; keys stay unique.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Serialize into an HTTP response, consuming the reply.
    pub fn into_response(self, server_header: &HeaderValue) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert(SERVER, server_header.clone());

        match StatusCode::from_u16(self.status_code) {
            Ok(status) => *response.status_mut() = status,
            Err(_) => {
                tracing::error!(
                    status_code = self.status_code,
                    "Reply carries an invalid status code"
                );
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                return response;
            }
        }

        if let Some(text) = self.custom_status_text {
            match ReasonPhrase::try_from(text.into_bytes()) {
                Ok(phrase) => {
                    response.extensions_mut().insert(phrase);
                }
                Err(_) => tracing::warn!("Skipping invalid custom status text"),
            }
        }

        let headers = response.headers_mut();
        for (name, value) in self.custom_headers.into_iter().flatten() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Skipping invalid custom header"),
            }
        }

        if let Some(body) = self.body {
            let mut bytes = Vec::with_capacity(body.len() + 1);
            bytes.push(b'\n');
            bytes.extend_from_slice(body.as_bytes());

            let content_type = HeaderValue::from_str(&self.mime_type).unwrap_or_else(|_| {
                tracing::warn!(mime_type = %self.mime_type, "Invalid MIME type, using default");
                HeaderValue::from_static(DEFAULT_MIME_TYPE)
            });
            headers.insert(CONTENT_TYPE, content_type);
            headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
            *response.body_mut() = Body::from(bytes);
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> HeaderValue {
        HeaderValue::from_static("route-dispatch/test")
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn defaults() {
        let reply = Reply::new(204);
        assert_eq!(reply.mime_type, "application/json");
        assert!(reply.body.is_none());
        assert!(reply.custom_headers.is_none());
    }

    #[tokio::test]
    async fn not_found_is_status_200_with_water_body() {
        let response = Reply::not_found().into_response(&server());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[SERVER], "route-dispatch/test");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            response.headers()[CONTENT_LENGTH],
            (NOT_FOUND_BODY.len() + 1).to_string().as_str()
        );
        assert_eq!(body_text(response).await, format!("\n{NOT_FOUND_BODY}"));
    }

    #[tokio::test]
    async fn no_body_means_no_content_type() {
        let response = Reply::new(204).into_response(&server());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(body_text(response).await, "");
    }

    #[test]
    fn custom_headers_can_override_server() {
        let response = Reply::new(200)
            .with_header("Server", "custom")
            .with_header("x-trace", "1")
            .into_response(&server());
        assert_eq!(response.headers()[SERVER], "custom");
        assert_eq!(response.headers()["x-trace"], "1");
    }

    #[test]
    fn content_type_follows_mime_type() {
        let response = Reply::json(201, "hi")
            .with_mime_type("text/plain")
            .with_header("content-type", "ignored/type")
            .into_response(&server());
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn invalid_headers_are_skipped() {
        let response = Reply::new(200)
            .with_header("bad header", "v")
            .with_header("x-ok", "v")
            .into_response(&server());
        assert!(response.headers().get("x-ok").is_some());
        assert_eq!(response.headers().len(), 2);
    }

    #[test]
    fn custom_status_text_becomes_reason_phrase() {
        let response = Reply::new(200)
            .with_status_text("Watered")
            .into_response(&server());
        let phrase = response.extensions().get::<ReasonPhrase>().unwrap();
        assert_eq!(phrase.as_bytes(), b"Watered");
    }

    #[test]
    fn invalid_status_code_degrades_to_500() {
        let response = Reply::json(42, "x").into_response(&server());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[SERVER], "route-dispatch/test");
    }

    #[test]
    fn envelope_helper_wraps_data() {
        let reply = Reply::envelope("ok", Some(vec![1, 2])).unwrap();
        assert_eq!(reply.status_code, 200);
        assert_eq!(reply.body.as_deref(), Some(r#"{"status":"ok","data":[1,2]}"#));

        let reply = Reply::envelope("deleted", Some(serde_json::Value::Null)).unwrap();
        assert_eq!(reply.body.as_deref(), Some(r#"{"status":"deleted"}"#));
    }
}
