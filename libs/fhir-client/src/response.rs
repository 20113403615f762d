//! Uniform response envelope returned by the service facade

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// `{success, data, error, statusCode}` as consumed by the dashboard routes.
///
/// `success == true` implies `error` is absent; `success == false` implies
/// `error` is present. `statusCode` is only set for HTTP protocol failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status_code: None,
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            status_code: error.status_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Map the payload, leaving failures untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            status_code: self.status_code,
        }
    }
}

impl ApiResponse<()> {
    /// Success of a call with no payload; `data` is left out of the JSON
    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            status_code: None,
        }
    }

    pub fn from_unit(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::done(),
            Err(err) => Self::failure(&err),
        }
    }
}

impl<T> From<Result<T>> for ApiResponse<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }
}
