//! zabbix-rpc - JSON-RPC client for the Zabbix API.
//!
//! The [`ZabbixClient`] exposes the query methods a dashboard renderer
//! needs (host groups, hosts, items, history, trends, triggers, SLA) and
//! transparently recovers from session expiry: an authentication failure
//! triggers a single coalesced login and one retry of the original call.

mod client;
mod params;
mod session;
mod transport;

pub use client::ZabbixClient;
pub use session::Session;
pub use transport::HttpTransport;
