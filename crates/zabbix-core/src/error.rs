//! Error types for the Zabbix client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, and input validation errors.

use std::fmt;
use thiserror::Error;

/// Messages the Zabbix API uses to report an expired or missing session.
///
/// Matching is exact and case-sensitive; both spellings of "authorised"
/// appear in the wild depending on server version.
const SESSION_EXPIRED_MESSAGES: [&str; 3] = [
    "Session terminated, re-login, please.",
    "Not authorised.",
    "Not authorized.",
];

/// The unified error type for Zabbix client operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (failed login, unrecoverable session expiry).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Errors reported by the Zabbix API itself (JSON-RPC error objects).
    #[error("api error: {0}")]
    Rpc(#[from] RpcError),

    /// Input validation errors (invalid API URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// A response decoded as JSON but did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Json(#[from] serde_json::Error),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error (non-2xx status, undecodable body).
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
///
/// `Clone` is required: a failed login is broadcast to every caller
/// waiting on the shared in-flight login future.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The login call itself failed.
    #[error("login failed: {message}")]
    LoginFailed { message: String },

    /// The session expired and re-login did not restore access.
    #[error("session expired and re-login did not restore access")]
    SessionExpired,
}

/// An error object returned by the Zabbix JSON-RPC API.
#[derive(Debug, Clone)]
pub struct RpcError {
    /// JSON-RPC error code.
    pub code: i64,
    /// Error message from the server.
    pub message: String,
    /// Additional detail; Zabbix often puts the human-readable reason here.
    pub data: Option<String>,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code, self.message)?;
        if let Some(ref data) = self.data {
            write!(f, " ({})", data)?;
        }
        Ok(())
    }
}

impl std::error::Error for RpcError {}

impl RpcError {
    /// Create a new API error.
    pub fn new(code: i64, message: impl Into<String>, data: Option<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    /// Check if this error reports an expired or missing session token.
    ///
    /// Depending on server version the marker string arrives either in
    /// `message` or in `data`, so both are checked.
    pub fn is_session_expired(&self) -> bool {
        SESSION_EXPIRED_MESSAGES
            .iter()
            .any(|m| self.message == *m || self.data.as_deref() == Some(m))
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid Zabbix API URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },
}
