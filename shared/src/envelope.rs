//! Discriminated `ok: true | false` response envelope
//!
//! Every upstream and proxy response body is a JSON object carrying an
//! `ok` boolean discriminant. `Envelope<T>` models the union as a
//! tagged Rust enum so each consumption site matches exhaustively
//! instead of probing loose optional fields.

use crate::error::ErrorCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// A response body discriminated by its `ok` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// `ok: true` — the payload fields sit beside the discriminant
    Ok(T),
    /// `ok: false` — an error code plus optional context
    Failure(Failure),
}

/// The `ok: false` side of the envelope.
///
/// `error` stays a raw string because upstream may emit codes outside
/// the local taxonomy; `code()` maps the known ones. Extra fields
/// (e.g. `po_id`/`status` on a `mail_failed` rejection) are preserved
/// in `extra` so callers can lift them into typed outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Failure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: code.as_str().to_string(),
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    /// The taxonomy code, when the wire string is a recognized one.
    pub fn code(&self) -> Option<ErrorCode> {
        ErrorCode::from_str(&self.error).ok()
    }

    /// Human-readable description: the message when present, the code
    /// string otherwise.
    pub fn describe(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.error)
    }

    /// Extra string field carried beside the error code.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Ok(_))
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Envelope::Ok(inner) => Ok(inner),
            Envelope::Failure(failure) => Err(failure),
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Envelope::Ok(_) => None,
            Envelope::Failure(failure) => Some(failure),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::Error;

        let (mut value, ok) = match self {
            Envelope::Ok(inner) => (serde_json::to_value(inner).map_err(Error::custom)?, true),
            Envelope::Failure(failure) => {
                (serde_json::to_value(failure).map_err(Error::custom)?, false)
            }
        };
        let obj = value
            .as_object_mut()
            .ok_or_else(|| Error::custom("envelope payload must serialize to a JSON object"))?;
        obj.insert("ok".to_string(), Value::Bool(ok));
        value.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let mut value = Value::deserialize(deserializer)?;
        let obj = value
            .as_object_mut()
            .ok_or_else(|| Error::custom("expected a JSON object with an `ok` field"))?;
        let ok = match obj.remove("ok") {
            Some(Value::Bool(b)) => b,
            _ => return Err(Error::custom("missing or non-boolean `ok` discriminant")),
        };
        if ok {
            serde_json::from_value(value)
                .map(Envelope::Ok)
                .map_err(Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Envelope::Failure)
                .map_err(Error::custom)
        }
    }
}
