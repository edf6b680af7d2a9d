use std::fmt::Display;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REQUEST_SUCCESSFUL: &str = "Request successful";
pub const REQUEST_TIMED_OUT: &str = "Request timed out";

/// Uniform outcome of every gateway call.
///
/// `success` is always derived from `status`, and `data` is only ever set on
/// a 2xx response that carried a JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub message: String,
    pub status: u16,
    pub success: bool,
}

/// A failed envelope, for callers that would rather use `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request failed with status {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, data: Option<T>, message: impl Into<String>) -> Self {
        let success = (200..300).contains(&status);
        Self {
            data: if success { data } else { None },
            message: message.into(),
            status,
            success,
        }
    }

    pub fn timed_out() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT.as_u16(), None, REQUEST_TIMED_OUT)
    }

    /// Transport-level failure: the gateway never produced a usable response.
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), None, message)
    }

    /// Local rejection that never reached the network.
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status.as_u16(), None, message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: self.data.map(f),
            message: self.message,
            status: self.status,
            success: self.success,
        }
    }

    /// Fallible payload conversion; a failed conversion is reported like an
    /// undecodable body.
    pub fn try_map<U, E: Display>(self, f: impl FnOnce(T) -> Result<U, E>) -> ApiResponse<U> {
        match self.data {
            Some(data) => match f(data) {
                Ok(converted) => ApiResponse {
                    data: Some(converted),
                    message: self.message,
                    status: self.status,
                    success: self.success,
                },
                Err(e) => ApiResponse::network_error(e.to_string()),
            },
            None => ApiResponse {
                data: None,
                message: self.message,
                status: self.status,
                success: self.success,
            },
        }
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ApiError {
                status: self.status,
                message: self.message,
            }),
        }
    }
}
