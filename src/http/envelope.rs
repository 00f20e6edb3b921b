//! Uniform JSON envelope used by handlers.
//!
//! Every handler body has the shape `{"status": <string>, "data": <value>}`.
//! `data` is left out entirely when it is `None` or serializes to JSON `null`.

use serde::ser::{Error as _, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Two-field JSON wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEnvelope<T> {
    pub status: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiEnvelope<T> {
    pub fn new(status: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.into(),
            data,
        }
    }

    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<T: Serialize> Serialize for ApiEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = match &self.data {
            Some(data) => serde_json::to_value(data).map_err(S::Error::custom)?,
            None => Value::Null,
        };

        let fields = if data.is_null() { 1 } else { 2 };
        let mut state = serializer.serialize_struct("ApiEnvelope", fields)?;
        state.serialize_field("status", &self.status)?;
        if data.is_null() {
            state.skip_field("data")?;
        } else {
            state.serialize_field("data", &data)?;
        }
        state.end()
    }
}
