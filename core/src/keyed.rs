//! Typed, key-based access to JSON objects.
//!
//! # Design
//! Every scalar type has two accessors: an optional one (`string`, `int`, ...)
//! that swallows every failure and returns `None`, and a required one
//! (`string_value`, `int_value`, ...) that reports exactly one error per
//! failure category. Keys are anything implementing [`CodingKey`], usually an
//! enum declared with [`coding_keys!`](crate::coding_keys) so field names are
//! spelled once.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

use crate::error::RestKitError;
use crate::json::JsonInitializable;

/// A symbolic name for a JSON field. The string must match the wire name exactly.
pub trait CodingKey {
    fn coding_key(&self) -> &str;
}

impl CodingKey for str {
    fn coding_key(&self) -> &str {
        self
    }
}

impl CodingKey for String {
    fn coding_key(&self) -> &str {
        self
    }
}

impl<K: CodingKey + ?Sized> CodingKey for &K {
    fn coding_key(&self) -> &str {
        (**self).coding_key()
    }
}

/// A closed enumeration that round-trips through a raw scalar value.
pub trait RawRepresentable: Sized {
    type Raw;

    fn from_raw(raw: Self::Raw) -> Option<Self>;
    fn raw_value(&self) -> Self::Raw;
}

/// Declare a string-backed enum usable as a [`CodingKey`] and [`RawRepresentable`].
///
/// ```
/// restkit_core::coding_keys! {
///     pub enum ScarerKey {
///         Name => "name",
///         Nickname => "nickname",
///     }
/// }
///
/// use restkit_core::CodingKey;
/// assert_eq!(ScarerKey::Nickname.coding_key(), "nickname");
/// ```
#[macro_export]
macro_rules! coding_keys {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::keyed::CodingKey for $name {
            fn coding_key(&self) -> &str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl $crate::keyed::RawRepresentable for $name {
            type Raw = String;

            fn from_raw(raw: String) -> Option<Self> {
                match raw.as_str() {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn raw_value(&self) -> String {
                $crate::keyed::CodingKey::coding_key(self).to_string()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Date formatters
// ---------------------------------------------------------------------------

/// Parses date strings found in JSON payloads.
pub trait DateFormatter {
    fn parse(&self, value: &str) -> Option<DateTime<Utc>>;
}

/// A `strftime`-style pattern. Values without an offset are read as UTC and
/// date-only patterns are read at midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat(pub String);

impl DateFormat {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }
}

impl DateFormatter for DateFormat {
    fn parse(&self, value: &str) -> Option<DateTime<Utc>> {
        let pattern = self.0.as_str();
        if let Ok(with_offset) = DateTime::parse_from_str(value, pattern) {
            return Some(with_offset.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(value, pattern)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

/// RFC 3339 / ISO 8601 timestamps such as `2024-05-01T12:00:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rfc3339;

impl DateFormatter for Rfc3339 {
    fn parse(&self, value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }
}

// ---------------------------------------------------------------------------
// Keyed accessors
// ---------------------------------------------------------------------------

/// Keyed accessors on a JSON value.
pub trait KeyedJson {
    /// The child stored under `key`, or `Null` when absent or not an object.
    fn keyed<K: CodingKey + ?Sized>(&self, key: &K) -> &Value;

    /// Required accessor built from an arbitrary extraction closure.
    fn value_with<K, T, F>(&self, key: &K, extract: F) -> Result<T, RestKitError>
    where
        K: CodingKey + ?Sized,
        F: FnOnce(&Value) -> Option<T>,
    {
        extract(self.keyed(key)).ok_or_else(|| RestKitError::NoValueForKey(key.coding_key().to_string()))
    }

    /// Decode the child under `key` with its own constructor.
    ///
    /// A missing (or `null`) child is still offered to the constructor so its
    /// own error wins; if it accepts `null`, the key counts as missing.
    fn value<T: JsonInitializable, K: CodingKey + ?Sized>(&self, key: &K) -> Result<T, RestKitError> {
        let child = self.keyed(key);
        let decoded = T::from_json(child)?;
        if child.is_null() {
            return Err(RestKitError::NoValueForKey(key.coding_key().to_string()));
        }
        Ok(decoded)
    }

    fn string<K: CodingKey + ?Sized>(&self, key: &K) -> Option<String> {
        self.keyed(key).as_str().map(str::to_string)
    }

    fn string_value<K: CodingKey + ?Sized>(&self, key: &K) -> Result<String, RestKitError> {
        self.value_with(key, |json| json.as_str().map(str::to_string))
    }

    fn int<K: CodingKey + ?Sized>(&self, key: &K) -> Option<i64> {
        self.keyed(key).as_i64()
    }

    fn int_value<K: CodingKey + ?Sized>(&self, key: &K) -> Result<i64, RestKitError> {
        self.value_with(key, Value::as_i64)
    }

    fn bool<K: CodingKey + ?Sized>(&self, key: &K) -> Option<bool> {
        self.keyed(key).as_bool()
    }

    fn bool_value<K: CodingKey + ?Sized>(&self, key: &K) -> Result<bool, RestKitError> {
        self.value_with(key, Value::as_bool)
    }

    fn double<K: CodingKey + ?Sized>(&self, key: &K) -> Option<f64> {
        self.keyed(key).as_f64()
    }

    fn double_value<K: CodingKey + ?Sized>(&self, key: &K) -> Result<f64, RestKitError> {
        self.value_with(key, Value::as_f64)
    }

    fn url<K: CodingKey + ?Sized>(&self, key: &K) -> Option<Url> {
        self.keyed(key).as_str().and_then(|s| Url::parse(s).ok())
    }

    /// Required absolute URL under `key`.
    ///
    /// [`Url`] only holds absolute URLs, so relative references such as
    /// `"/img/mike.jpg"` are rejected with [`RestKitError::AwkwardUrl`].
    /// Resolve them against a base with [`Url::join`] on the raw string
    /// from [`string_value`](KeyedJson::string_value) instead.
    fn url_value<K: CodingKey + ?Sized>(&self, key: &K) -> Result<Url, RestKitError> {
        let string = self.string_value(key)?;
        Url::parse(&string).map_err(|_| RestKitError::AwkwardUrl(string))
    }

    fn date<K, F>(&self, key: &K, formatter: &F) -> Option<DateTime<Utc>>
    where
        K: CodingKey + ?Sized,
        F: DateFormatter + ?Sized,
    {
        self.keyed(key).as_str().and_then(|s| formatter.parse(s))
    }

    fn date_value<K, F>(&self, key: &K, formatter: &F) -> Result<DateTime<Utc>, RestKitError>
    where
        K: CodingKey + ?Sized,
        F: DateFormatter + ?Sized,
    {
        let string = self.string_value(key)?;
        formatter.parse(&string).ok_or(RestKitError::WrongDateFormat)
    }

    /// Bridge a scalar to an enumeration through its raw value.
    fn raw_representable_value<T, K, F>(&self, key: &K, extract: F) -> Result<T, RestKitError>
    where
        T: RawRepresentable,
        K: CodingKey + ?Sized,
        F: FnOnce(&Value) -> Option<T::Raw>,
    {
        let raw = self.value_with(key, extract)?;
        T::from_raw(raw).ok_or(RestKitError::FailedToInitializeRawRepresentable)
    }
}

impl KeyedJson for Value {
    fn keyed<K: CodingKey + ?Sized>(&self, key: &K) -> &Value {
        &self[key.coding_key()]
    }
}

/// Build a JSON object from `(key, value)` pairs. Later pairs overwrite
/// earlier ones with the same key.
pub fn json_object<K, I>(pairs: I) -> Value
where
    K: CodingKey,
    I: IntoIterator<Item = (K, Value)>,
{
    let map = pairs.into_iter().fold(Map::new(), |mut map, (key, value)| {
        map.insert(key.coding_key().to_string(), value);
        map
    });
    Value::Object(map)
}
