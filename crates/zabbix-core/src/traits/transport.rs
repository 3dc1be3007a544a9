//! API transport trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// The JSON-RPC transport boundary.
///
/// Implementations own the HTTP layer and the JSON-RPC envelope. The
/// session manager and the request dispatcher are written against this
/// trait, which also makes them testable without a server.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issue an API call with the given method and params.
    ///
    /// `token` is the current session token; `None` sends the request
    /// anonymously (the server answers authenticated methods with a
    /// "Not authorised." error, which the dispatcher recovers from).
    async fn request(&self, method: &str, params: &Value, token: Option<&str>) -> Result<Value>;

    /// Authenticate with `user.login` and return a fresh session token.
    ///
    /// Never sends a session token; the API rejects `user.login` calls
    /// that carry one.
    async fn login(&self, username: &str, password: &str) -> Result<String>;

    /// Fetch the server version with `apiinfo.version`.
    ///
    /// Always anonymous; used by connection tests before any login.
    async fn api_version(&self) -> Result<String>;
}
