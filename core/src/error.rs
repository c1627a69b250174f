//! Error type shared by the decoding layer and the request pipeline.
//!
//! # Design
//! The first seven variants form the closed decoding taxonomy: each one names
//! exactly one failure category of the keyed accessors or response
//! processing. The remaining variants wrap collaborator failures (JSON
//! parser, filesystem, transport) and surface them unchanged through
//! `#[source]`.

use thiserror::Error;

/// Boxed error produced by a [`Session`](crate::session::Session) implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by keyed accessors, JSON constructors and request execution.
#[derive(Debug, Error)]
pub enum RestKitError {
    /// A required accessor found no value of the requested type under `key`.
    #[error("No value for key {0}")]
    NoValueForKey(String),

    /// A date string was present but the formatter rejected it.
    #[error("Wrong date format")]
    WrongDateFormat,

    /// Response processing expected a body but the response carried none.
    #[error("No data")]
    NoDataInResponse,

    /// The server answered with a status code the endpoint does not accept.
    #[error("{}", describe_unexpected_code(*code, body.as_deref()))]
    UnexpectedCode { code: u16, body: Option<Vec<u8>> },

    /// A sequence decode was attempted on a JSON value that is not an array.
    #[error("Wrong json format")]
    WrongJsonFormat,

    /// A raw value did not match any case of the target enumeration.
    #[error("Failed to create from raw representable")]
    FailedToInitializeRawRepresentable,

    /// A string value exists but is not a syntactically valid URL.
    #[error("Awkward url {0}")]
    AwkwardUrl(String),

    /// The bytes could not be parsed as JSON, or a value could not be serialized.
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a JSON file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),

    /// The API path could not be joined onto the domain's base URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn describe_unexpected_code(code: u16, body: Option<&[u8]>) -> String {
    match body.and_then(|bytes| std::str::from_utf8(bytes).ok()) {
        Some(message) => format!("Unexpected code {code} with message {message}"),
        None => format!("Unexpected code {code}"),
    }
}

impl RestKitError {
    /// Wrap any transport failure without reinterpreting it.
    pub fn transport(error: impl Into<TransportError>) -> Self {
        RestKitError::Transport(error.into())
    }
}
