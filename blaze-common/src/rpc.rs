//! Request/response envelope used by the bridge layer.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::json;

/// The method name is unknown.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// The payload does not match the method.
pub const INVALID_PARAMS: i32 = -32602;
/// A required field is missing or invalid.
pub const VALIDATION_ERROR: i32 = -1;
/// The method needs an active session.
pub const NOT_CONNECTED: i32 = -2;
/// A session is already active.
pub const ALREADY_CONNECTED: i32 = -3;
/// The node backend refused or failed the request.
pub const BACKEND_ERROR: i32 = -4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Str(String),
    Int(u64),
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Str(value.to_owned())
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id::Int(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<T: Serialize> {
    pub method: String,
    pub params: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl<T: Serialize> Request<T> {
    pub fn new(method: &str, params: T) -> Self {
        Request {
            method: method.to_owned(),
            params,
            id: Some("blaze/bridge/1".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<Id>,
}

impl<T> Response<T> {
    pub fn ok(id: Option<Id>, result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn err(id: Option<Id>, error: RpcError) -> Self {
        Self {
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Extract the result from a response, consuming the response.
    pub fn into_result(self) -> Result<T, RpcError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.result
            .ok_or_else(|| RpcError::new(BACKEND_ERROR, "response without result or error"))
    }
}

/// Error shape handed back to the caller, `message` is meant for humans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<json::Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("method `{method}` not found"))
    }

    pub fn invalid_params(method: &str, err: impl fmt::Display) -> Self {
        Self::new(INVALID_PARAMS, format!("invalid params for `{method}`: {err}"))
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for RpcError {}
