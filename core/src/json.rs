//! Capabilities for building types from JSON and rendering them back.
//!
//! # Design
//! `JsonInitializable` and `JsonRepresentable` are deliberately independent:
//! many response types are only ever decoded and many request payloads are
//! only ever encoded. `JsonCoding` names the pair for types that do both.
//!
//! Sequences get both capabilities for free, so `Vec<Scarer>` decodes from a
//! JSON array as soon as `Scarer` decodes from an object.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::RestKitError;

/// A type that can be constructed from a JSON value.
pub trait JsonInitializable: Sized {
    fn from_json(json: &Value) -> Result<Self, RestKitError>;

    /// Parse raw bytes as JSON and construct `Self` from them.
    fn from_slice(bytes: &[u8]) -> Result<Self, RestKitError> {
        let json: Value = serde_json::from_slice(bytes)?;
        Self::from_json(&json)
    }

    /// Load and decode a JSON file.
    fn from_file(path: impl AsRef<Path>) -> Result<Self, RestKitError> {
        let bytes = fs::read(path)?;
        Self::from_slice(&bytes)
    }
}

/// A type that can always be rendered as a JSON value.
pub trait JsonRepresentable {
    fn to_json(&self) -> Value;

    /// Serialize `to_json()` and write the bytes to `path`.
    fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), RestKitError> {
        let bytes = serde_json::to_vec(&self.to_json())?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Types that both decode from and encode to JSON.
pub trait JsonCoding: JsonInitializable + JsonRepresentable {}

impl<T: JsonInitializable + JsonRepresentable> JsonCoding for T {}

impl JsonInitializable for Value {
    fn from_json(json: &Value) -> Result<Self, RestKitError> {
        Ok(json.clone())
    }
}

impl JsonRepresentable for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }
}

/// Decodes element by element; the first failing element aborts the decode.
impl<T: JsonInitializable> JsonInitializable for Vec<T> {
    fn from_json(json: &Value) -> Result<Self, RestKitError> {
        let elements = json.as_array().ok_or(RestKitError::WrongJsonFormat)?;
        elements.iter().map(T::from_json).collect()
    }
}

impl<T: JsonRepresentable> JsonRepresentable for [T] {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(JsonRepresentable::to_json).collect())
    }
}

impl<T: JsonRepresentable> JsonRepresentable for Vec<T> {
    fn to_json(&self) -> Value {
        self.as_slice().to_json()
    }
}

// ---------------------------------------------------------------------------
// Response body helpers
// ---------------------------------------------------------------------------

/// Parse an optional response body, failing with `NoDataInResponse` when absent.
pub fn json_for_data(data: Option<&[u8]>) -> Result<Value, RestKitError> {
    let bytes = data.ok_or(RestKitError::NoDataInResponse)?;
    Ok(serde_json::from_slice(bytes)?)
}

pub fn parsed_object<T: JsonInitializable>(data: Option<&[u8]>) -> Result<T, RestKitError> {
    T::from_json(&json_for_data(data)?)
}

pub fn parsed_objects<T: JsonInitializable>(data: Option<&[u8]>) -> Result<Vec<T>, RestKitError> {
    Vec::from_json(&json_for_data(data)?)
}

/// Decode the array stored under `key` in the body's root object.
pub fn parsed_objects_for_key<T: JsonInitializable>(
    data: Option<&[u8]>,
    key: &str,
) -> Result<Vec<T>, RestKitError> {
    parsed_objects_in(&json_for_data(data)?, key)
}

pub fn parsed_objects_in<T: JsonInitializable>(json: &Value, key: &str) -> Result<Vec<T>, RestKitError> {
    Vec::from_json(&json[key])
}
