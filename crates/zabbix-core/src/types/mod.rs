//! Core value types.

mod api_url;
mod value_type;

pub use api_url::ApiUrl;
pub use value_type::ValueType;
