//! Authentication for the management API

pub mod api_key;
