pub mod api_key;
pub mod logger;
pub mod validation;
