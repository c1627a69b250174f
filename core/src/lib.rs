//! Declarative REST requests and typed JSON decoding.
//!
//! # Overview
//! An endpoint is described once as a [`RequestConfiguration`]: a
//! [`Domain`] (base URL), a path, an [`HttpMethod`], a [`RequestContent`]
//! body and a [`Session`] that carries it. The configuration turns itself
//! into an [`HttpRequest`], hands it to the session, and converts the
//! [`HttpResponse`] into its typed output.
//!
//! Decoding builds on `serde_json::Value`: [`KeyedJson`] adds required and
//! optional accessors keyed by a [`CodingKey`], and [`JsonInitializable`] /
//! [`JsonRepresentable`] describe types that decode from and encode to JSON.
//!
//! # Design
//! - Configurations are plain values, built fresh for every call.
//! - The session is the only shared object and is passed in explicitly.
//! - Every failure surfaces as one [`RestKitError`] through one channel.

pub mod domain;
pub mod error;
pub mod http;
pub mod json;
pub mod keyed;
pub mod request;
pub mod session;

pub use domain::{Domain, UrlDomain};
pub use error::RestKitError;
pub use http::{CachePolicy, HttpMethod, HttpRequest, HttpResponse, RequestContent};
pub use json::{JsonCoding, JsonInitializable, JsonRepresentable};
pub use keyed::{json_object, CodingKey, DateFormat, DateFormatter, KeyedJson, RawRepresentable, Rfc3339};
pub use request::{decode_json_response, DataTask, GetRequestConfiguration, RequestConfiguration};
pub use session::{ReqwestSession, Session, SessionConfig};
