//! Connection options for the HTTP transport.

/// Options forwarded from the datasource configuration to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Send an HTTP basic auth header alongside every request.
    pub basic_auth: bool,
    /// Include cookies on requests (browser-style `withCredentials`).
    pub with_credentials: bool,
}

impl ConnectionOptions {
    /// Options with everything disabled.
    pub fn new() -> Self {
        Self::default()
    }
}
