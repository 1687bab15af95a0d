//! Portal Core - Admin identity types and store abstractions
//!
//! This crate defines the data model shared by the tenant portal's
//! authentication flow: admin identities, session keys, the find-by-field
//! store capability, database connection profiles and logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
