//! JSON-RPC HTTP transport for the Zabbix API.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument, trace};

use zabbix_core::{
    ApiTransport, ApiUrl, ConnectionOptions, Error, Result, RpcError, TransportError,
};

use crate::params::{APIINFO_VERSION, USER_LOGIN};

const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a Value,
    /// Session token; omitted for anonymous calls (`user.login`,
    /// `apiinfo.version`, or a not-yet-authenticated session).
    #[serde(skip_serializing_if = "Option::is_none")]
    auth: Option<&'a str>,
    id: u64,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

/// Error object inside the response envelope. `data` may be a string or
/// a structured value depending on server version.
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorBody {
    fn into_rpc_error(self) -> RpcError {
        let data = self.data.map(|d| match d {
            Value::String(s) => s,
            other => other.to_string(),
        });
        RpcError::new(self.code, self.message, data)
    }
}

/// HTTP transport speaking JSON-RPC 2.0 to a Zabbix server.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    basic: Option<(String, String)>,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a new transport for the given server URL.
    pub fn new(url: &ApiUrl, options: ConnectionOptions) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("zabbix-rpc/", env!("CARGO_PKG_VERSION")))
            .cookie_store(options.with_credentials)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            endpoint: url.endpoint(),
            basic: None,
            next_id: AtomicU64::new(1),
        }
    }

    /// Send an HTTP basic auth header with every request, in addition to
    /// the JSON-RPC session token.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.basic = Some((username.into(), password.into()));
        self
    }

    /// Returns the JSON-RPC endpoint this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one JSON-RPC call and unwrap the envelope.
    #[instrument(skip(self, params, token), fields(endpoint = %self.endpoint))]
    async fn call(&self, method: &str, params: &Value, token: Option<&str>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            auth: token,
            id,
        };
        debug!(method, id, "JSON-RPC request");
        trace!(?params, "request parameters");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some((username, password)) = &self.basic {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        trace!(status = %status, "JSON-RPC response");

        if !status.is_success() {
            return Err(TransportError::Http {
                message: format!("HTTP {status}"),
            }
            .into());
        }

        let envelope: RpcResponse = response.json().await.map_err(transport_error)?;
        if let Some(error) = envelope.error {
            return Err(Error::Rpc(error.into_rpc_error()));
        }

        envelope.result.ok_or_else(|| {
            Error::Transport(TransportError::Http {
                message: "response contains neither result nor error".to_string(),
            })
        })
    }

    /// Unwrap a result expected to be a bare JSON string.
    fn expect_string(method: &str, result: Value) -> Result<String> {
        match result {
            Value::String(s) => Ok(s),
            other => Err(Error::Transport(TransportError::Http {
                message: format!("unexpected {method} result: {other}"),
            })),
        }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn request(&self, method: &str, params: &Value, token: Option<&str>) -> Result<Value> {
        self.call(method, params, token).await
    }

    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let params = json!({ "user": username, "password": password });
        let result = self.call(USER_LOGIN, &params, None).await?;
        Self::expect_string(USER_LOGIN, result)
    }

    async fn api_version(&self) -> Result<String> {
        let params = json!([]);
        let result = self.call(APIINFO_VERSION, &params, None).await?;
        Self::expect_string(APIINFO_VERSION, result)
    }
}

/// Map reqwest failures onto the transport error taxonomy.
fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}
