//! zabbix-core - Core types and traits for the Zabbix dashboard client.

pub mod credentials;
pub mod entity;
pub mod error;
pub mod options;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use entity::{
    Acknowledge, Application, Event, HistoryPoint, Host, HostGroup, ItService, Item, ServiceSla,
    SlaInterval, TrendPoint, Trigger,
};
pub use error::{AuthError, Error, InvalidInputError, RpcError, TransportError};
pub use options::ConnectionOptions;
pub use traits::ApiTransport;
pub use types::{ApiUrl, ValueType};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
