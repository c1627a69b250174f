//! HTTP request and response values exchanged with a [`Session`](crate::session::Session).
//!
//! # Design
//! Requests and responses are plain data. `HttpRequest::build` is the single
//! place that turns a method, URL, body and optional ETag into headers and
//! bytes, so every request configuration produces the same wire contract.
//! Sessions only translate these values to and from their HTTP client.
//!
//! Bodies are raw bytes (`Vec<u8>`) because responses are not guaranteed to
//! be UTF-8; endpoints that fetch images or other binary payloads parse the
//! bytes themselves.

use std::fmt;

use serde_json::{Map, Value};
use url::Url;

use crate::error::RestKitError;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const IF_NONE_MATCH: &str = "If-None-Match";
pub const ETAG: &str = "ETag";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Canonical wire string for the method.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body carried by a request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestContent {
    /// A JSON document, sent as its raw serialized bytes.
    Json(Value),
    /// No body and no content headers.
    #[default]
    None,
}

impl RequestContent {
    /// Wrap a key/value mapping as a JSON object body.
    pub fn from_map(map: Map<String, Value>) -> Self {
        RequestContent::Json(Value::Object(map))
    }

    /// `Content-Type` value for this content, or `None` when there is no body.
    pub fn header_field(&self) -> Option<&'static str> {
        match self {
            RequestContent::Json(_) => Some("application/json"),
            RequestContent::None => None,
        }
    }
}

/// Whether a session may answer from a local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    #[default]
    UseProtocolCachePolicy,
    /// Always go to the origin; set whenever a conditional ETag request is made.
    ReloadIgnoringLocalCache,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub cache_policy: CachePolicy,
}

impl HttpRequest {
    /// Assemble a request for `url`.
    ///
    /// JSON content sets `Content-Type`, `Content-Encoding: gzip` and the raw
    /// serialized body. The body is not compressed even though the encoding
    /// header says so; servers talking to this library rely on that exact
    /// pairing. An ETag adds `If-None-Match` and bypasses any local cache.
    pub fn build(
        url: Url,
        method: HttpMethod,
        content: &RequestContent,
        etag: Option<&str>,
    ) -> Result<Self, RestKitError> {
        let mut request = HttpRequest {
            method,
            url,
            headers: Vec::new(),
            body: None,
            cache_policy: CachePolicy::default(),
        };

        if let (RequestContent::Json(json), Some(content_type)) = (content, content.header_field()) {
            request.add_header(CONTENT_TYPE, content_type);
            request.set_header(CONTENT_ENCODING, "gzip");
            request.body = Some(serde_json::to_vec(json)?);
        }

        if let Some(etag) = etag {
            request.set_header(IF_NONE_MATCH, etag);
            request.cache_policy = CachePolicy::ReloadIgnoringLocalCache;
        }

        Ok(request)
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Append a header, keeping any existing values for the same name.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Replace every value of header `name` with `value`.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.add_header(name, value);
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Entity tag the server attached to this response, if any.
    pub fn etag(&self) -> Option<&str> {
        self.header(ETAG)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
