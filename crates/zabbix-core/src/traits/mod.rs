//! Trait definitions.

mod transport;

pub use transport::ApiTransport;
