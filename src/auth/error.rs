//! Authentication error types.
//!
//! Provides structured error codes for signature-gate failures. Every
//! failure funnels through one exit path: `IntoResponse`, which logs the
//! rejection and renders the uniform JSON error envelope. The gate never
//! terminates the process on failure.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Authentication error codes (4101-4109).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 4101: `who` token could not be decoded
    Decode = 4101,
    /// 4102: malformed or disallowed user reference
    Validation = 4102,
    /// 4103: client timestamp outside the freshness window
    Stale = 4103,
    /// 4104: unknown user reference
    NotFound = 4104,
    /// 4105: digest mismatch
    Credentials = 4105,
    /// 4106: request token already used
    Replay = 4106,
    /// 4107: too many requests inside the trailing window
    Throttled = 4107,
    /// 4108: privileged bypass route misused or disabled
    Config = 4108,
    /// 4109: internal server error
    Internal = 4109,
}

impl AuthErrorCode {
    /// Get error code as i32.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get error name string.
    pub fn name(self) -> &'static str {
        match self {
            Self::Decode => "DECODE_FAILED",
            Self::Validation => "INVALID_USER_REF",
            Self::Stale => "STALE_TIMESTAMP",
            Self::NotFound => "UNKNOWN_USER_REF",
            Self::Credentials => "BAD_CREDENTIALS",
            Self::Replay => "REQUEST_REPLAYED",
            Self::Throttled => "RATE_LIMITED",
            Self::Config => "BYPASS_DISABLED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::Decode | Self::Validation => StatusCode::BAD_REQUEST,
            Self::Replay => StatusCode::CONFLICT,
            Self::Throttled => StatusCode::TOO_MANY_REQUESTS,
            Self::Config => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Authentication error with message and offending field.
#[derive(Debug, Clone)]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
    pub field: Option<&'static str>,
}

impl AuthError {
    /// Create a new auth error.
    pub fn new(code: AuthErrorCode, message: impl Into<String>, field: Option<&'static str>) -> Self {
        Self {
            code,
            message: message.into(),
            field,
        }
    }

    /// Create error with default message.
    pub fn from_code(code: AuthErrorCode) -> Self {
        let message = match code {
            AuthErrorCode::Decode => "Could not decode request token",
            AuthErrorCode::Validation => "User reference is not allowed",
            AuthErrorCode::Stale => "Request timestamp outside allowed window",
            AuthErrorCode::NotFound => "Unknown user reference",
            AuthErrorCode::Credentials => "Request signature verification failed",
            AuthErrorCode::Replay => "Request token already used",
            AuthErrorCode::Throttled => "Too many requests",
            AuthErrorCode::Config => "Privileged bypass is not enabled",
            AuthErrorCode::Internal => "Internal server error",
        };
        Self::new(code, message, None)
    }

    /// Wrap a store failure without leaking it to the client envelope.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        tracing::error!("authentication store failure: {}", err);
        Self::from_code(AuthErrorCode::Internal)
    }
}

/// Inner error object of the JSON envelope.
#[derive(Debug, Serialize)]
pub struct AuthErrorDetail {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// JSON response envelope for auth errors.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub status: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub error: AuthErrorDetail,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        tracing::warn!(
            code = self.code.code(),
            kind = self.code.name(),
            field = self.field.unwrap_or(""),
            "request rejected: {}",
            self.message
        );
        let body = AuthErrorResponse {
            status: "error",
            status_code: status.as_u16(),
            message: self.message,
            error: AuthErrorDetail {
                code: self.code.code(),
                field: self.field,
                kind: self.code.name(),
            },
        };
        (status, Json(body)).into_response()
    }
}
