//! Database access layer
//!
//! One module per table, plain SQL with positional binds.

pub mod api_keys;
pub mod integrations;
pub mod inventory;
pub mod mappings;
pub mod orders;
pub mod outbound_logs;
pub mod sync_logs;
pub mod webhook_queue;
