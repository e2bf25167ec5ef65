//! Outbound HTTP responses.
//!
//! A response is a plain value: status, headers, body. Error responses
//! carry the S3 XML error envelope and always set `Content-Type` and
//! `Content-Length`.

use bytes::Bytes;
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};

use oxgate_s3_model::S3Error;
use oxgate_s3_xml::error_to_xml;

/// Response handed back to the transport once an action finishes.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body, empty for successful bucket operations.
    pub body: Bytes,
}

impl OutboundResponse {
    /// An empty 200 response.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// An empty 200 response with a `Location` header naming the created
    /// resource.
    #[must_use]
    pub fn created(resource_path: &str) -> Self {
        let mut response = Self::ok();
        if let Ok(value) = HeaderValue::from_str(resource_path) {
            response.headers.insert(header::LOCATION, value);
        }
        response
    }

    /// Add a header to the response.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Render an error as its XML envelope.
    ///
    /// The body is the flat `<Error>` document; `Content-Type` and
    /// `Content-Length` are set to match it.
    #[must_use]
    pub fn from_error(err: &S3Error) -> Self {
        let request_id = err.request_id.as_deref().unwrap_or("unknown");
        let body = error_to_xml(
            err.code.as_str(),
            &err.message,
            err.resource.as_deref(),
            request_id,
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/xml"),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

        Self {
            status: err.status_code,
            headers,
            body: Bytes::from(body),
        }
    }
}
