use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

/// Decodes a field the gateway sometimes sends as a JSON-encoded string
/// (raw database column) and sometimes as the structured value itself.
/// Null and blank strings decode to the default.
pub(crate) fn json_or_encoded<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::String(encoded) if encoded.trim().is_empty() => Ok(T::default()),
        Value::String(encoded) => serde_json::from_str(&encoded).map_err(serde::de::Error::custom),
        other => serde_json::from_value(other).map_err(serde::de::Error::custom),
    }
}
