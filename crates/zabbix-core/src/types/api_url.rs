//! Zabbix API URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Path of the JSON-RPC endpoint relative to the server root.
const ENDPOINT_PATH: &str = "api_jsonrpc.php";

/// A validated Zabbix server URL.
///
/// Accepts either the server base URL (`https://zabbix.example.org`) or the
/// full endpoint as it appears in frontend configuration
/// (`https://zabbix.example.org/api_jsonrpc.php`); both resolve to the same
/// endpoint.
///
/// # Example
///
/// ```
/// use zabbix_core::ApiUrl;
///
/// let url = ApiUrl::new("https://zabbix.example.org").unwrap();
/// assert_eq!(url.endpoint(), "https://zabbix.example.org/api_jsonrpc.php");
///
/// let url = ApiUrl::new("https://zabbix.example.org/api_jsonrpc.php").unwrap();
/// assert_eq!(url.endpoint(), "https://zabbix.example.org/api_jsonrpc.php");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute, not HTTP(S), or has
    /// no host. Plain HTTP is allowed; Zabbix servers on internal
    /// networks commonly run without TLS.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash
        let normalized = if url.path() == "/" {
            let mut u = url.clone();
            u.set_path("");
            u
        } else {
            url
        };

        Ok(Self(normalized))
    }

    /// Returns the JSON-RPC endpoint URL.
    pub fn endpoint(&self) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        if base.ends_with(ENDPOINT_PATH) {
            base.to_string()
        } else {
            format!("{}/{}", base, ENDPOINT_PATH)
        }
    }

    /// Returns the configured URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTP or HTTPS".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
