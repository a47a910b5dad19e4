//! Turns whatever the HTTP layer handed back into JSON bytes a strict decoder can consume.

use crate::error::UpstreamError;
use serde::de::DeserializeOwned;

/// Loosely-typed result of an API fetch.
///
/// The fetch layer never returns an error; failures are folded into [`RawResponse::Failed`]
/// so that collectors treat them the same way as an unusable body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Bytes(Vec<u8>),
    Text(String),
    /// A body that was already parsed. `Value::Null` means nothing came back.
    Json(serde_json::Value),
    /// Error sentinel carrying the reason the request failed.
    Failed(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CoercionError {
    #[error("request failed: {0}")]
    Upstream(String),
    #[error("response carried no body")]
    Empty,
    #[error("cannot serialize response: {0}")]
    Serialize(String),
}

pub fn coerce_to_json_bytes(raw: RawResponse) -> Result<Vec<u8>, CoercionError> {
    match raw {
        RawResponse::Bytes(bytes) => Ok(bytes),
        RawResponse::Text(text) => Ok(text.into_bytes()),
        RawResponse::Json(serde_json::Value::Null) => Err(CoercionError::Empty),
        RawResponse::Json(value) => serde_json::to_vec(&value).map_err(|e| CoercionError::Serialize(e.to_string())),
        RawResponse::Failed(reason) => Err(CoercionError::Upstream(reason)),
    }
}

/// Coerces and then strictly decodes into `T`. The two failure kinds stay distinguishable.
pub fn decode<T: DeserializeOwned>(raw: RawResponse) -> Result<T, UpstreamError> {
    let bytes = coerce_to_json_bytes(raw)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Item {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "IndexNumber", default)]
        index: i64,
    }

    #[test]
    fn byte_like_payloads_pass_through() {
        assert_eq!(coerce_to_json_bytes(RawResponse::Bytes(b"[1]".to_vec())).unwrap(), b"[1]");
        assert_eq!(coerce_to_json_bytes(RawResponse::Text("{}".to_string())).unwrap(), b"{}");
    }

    #[test]
    fn structured_and_raw_payloads_decode_identically() {
        let structured = json!([{ "Name": "Pilot", "IndexNumber": 1 }, { "Name": "Movie" }]);
        let raw = structured.to_string();

        let from_value: Vec<Item> = decode(RawResponse::Json(structured)).unwrap();
        let from_bytes: Vec<Item> = decode(RawResponse::Bytes(raw.clone().into_bytes())).unwrap();
        let from_text: Vec<Item> = decode(RawResponse::Text(raw)).unwrap();

        assert_eq!(from_value, from_bytes);
        assert_eq!(from_bytes, from_text);
        assert_eq!(from_value[1].index, 0);
    }

    #[test]
    fn sentinels_are_coercion_failures() {
        assert_eq!(
            coerce_to_json_bytes(RawResponse::Failed("401 Unauthorized".to_string())),
            Err(CoercionError::Upstream("401 Unauthorized".to_string()))
        );
        assert_eq!(
            coerce_to_json_bytes(RawResponse::Json(serde_json::Value::Null)),
            Err(CoercionError::Empty)
        );
    }

    #[test]
    fn malformed_bodies_are_decode_failures() {
        let err = decode::<Vec<Item>>(RawResponse::Text("<html>".to_string())).unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));

        let err = decode::<Vec<Item>>(RawResponse::Json(json!({ "Name": 3 }))).unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));

        let err = decode::<Vec<Item>>(RawResponse::Failed("timeout".to_string())).unwrap_err();
        assert!(matches!(err, UpstreamError::Coercion(CoercionError::Upstream(_))));
    }
}
