//! FinHub Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling, and logging for the FinHub workspace.
//!
//! # Overview
//!
//! This crate provides the pieces used by every FinHub workspace member:
//!
//! - **Error Handling**: the common error type and result alias
//! - **Logging**: tracing subscriber setup with console/file output
//!
//! # Example
//!
//! ```no_run
//! use finhub_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CoreError, Result};
