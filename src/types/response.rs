//! The uniform response envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PanelError, Result};

/// Message used when a backend reports failure without explaining it.
const UNEXPLAINED_FAILURE: &str = "Request was not successful";

/// Uniform `{ success, data, message }` shape every client call resolves to.
///
/// `success = true` implies `data` is present whenever the backend sent a
/// body; `success = false` implies `message` explains the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Successful envelope without data (logout, fire-and-forget calls).
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Take the data out, failing with [`PanelError::EmptyResponse`] when absent.
    pub fn into_data(self) -> Result<T> {
        self.data.ok_or(PanelError::EmptyResponse)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
        }
    }
}

impl ApiResponse<Value> {
    /// Build an envelope from a successful HTTP response body.
    ///
    /// Bodies that already have the envelope shape (a boolean `success`
    /// next to `data` or `message`) are unwrapped; any other body becomes
    /// the data of a successful envelope, with a top-level `message`
    /// string lifted out when present.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Null => Self {
                success: true,
                data: None,
                message: None,
            },
            Value::Object(mut map)
                if map.get("success").is_some_and(Value::is_boolean)
                    && (map.contains_key("data") || map.contains_key("message")) =>
            {
                let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
                let data = map.remove("data").filter(|v| !v.is_null());
                let mut message = map
                    .remove("message")
                    .and_then(|m| m.as_str().map(str::to_owned));
                if !success && message.is_none() {
                    message = Some(UNEXPLAINED_FAILURE.to_string());
                }
                Self {
                    success,
                    data,
                    message,
                }
            }
            other => {
                let message = other
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                Self {
                    success: true,
                    data: Some(other),
                    message,
                }
            }
        }
    }

    /// Deserialize the data into a concrete type.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ApiResponse<T>> {
        let data = self.data.map(serde_json::from_value).transpose()?;
        Ok(ApiResponse {
            success: self.success,
            data,
            message: self.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_body_becomes_data() {
        let resp = ApiResponse::from_body(json!({"totalUsers": 10}));
        assert!(resp.success);
        assert_eq!(resp.data, Some(json!({"totalUsers": 10})));
        assert!(resp.message.is_none());
    }

    #[test]
    fn plain_body_message_is_lifted() {
        let resp = ApiResponse::from_body(json!({"id": "1", "message": "created"}));
        assert_eq!(resp.message.as_deref(), Some("created"));
        assert_eq!(resp.data.unwrap()["id"], "1");
    }

    #[test]
    fn envelope_body_is_unwrapped() {
        let resp = ApiResponse::from_body(json!({
            "success": true,
            "data": {"totalUsers": 10},
            "message": "ok"
        }));
        assert!(resp.success);
        assert_eq!(resp.data, Some(json!({"totalUsers": 10})));
        assert_eq!(resp.message.as_deref(), Some("ok"));
    }

    #[test]
    fn failed_envelope_always_has_message() {
        let resp = ApiResponse::from_body(json!({"success": false, "data": null}));
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.message.as_deref(), Some(UNEXPLAINED_FAILURE));
    }

    #[test]
    fn success_flag_alone_is_not_an_envelope() {
        let resp = ApiResponse::from_body(json!({"success": true}));
        assert_eq!(resp.data, Some(json!({"success": true})));
    }

    #[test]
    fn null_body_has_no_data() {
        let resp = ApiResponse::from_body(Value::Null);
        assert!(resp.success);
        assert!(resp.data.is_none());
    }

    #[test]
    fn decode_into_type() {
        #[derive(Deserialize)]
        struct Stats {
            total: u32,
        }
        let resp = ApiResponse::from_body(json!({"total": 3}))
            .decode::<Stats>()
            .unwrap();
        assert_eq!(resp.data.unwrap().total, 3);
    }

    #[test]
    fn decode_mismatch_is_json_error() {
        let err = ApiResponse::from_body(json!({"total": "many"}))
            .decode::<Vec<u32>>()
            .unwrap_err();
        assert!(matches!(err, PanelError::Json(_)));
    }

    #[test]
    fn into_data_on_empty_envelope() {
        let resp: ApiResponse<u32> = ApiResponse::empty("done");
        assert!(matches!(resp.into_data(), Err(PanelError::EmptyResponse)));
    }
}
