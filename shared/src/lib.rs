//! Shared types for the commerce sync engine
//!
//! Common types used across crates: error codes and the unified
//! [`error::AppError`], domain enums with their fixed mapping tables,
//! and small utility helpers.

pub mod error;
pub mod types;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use types::{OrderChannel, OrderStatus, PlatformType, ProductKind};
