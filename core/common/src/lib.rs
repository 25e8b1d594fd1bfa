//! Common utilities and types shared across ChainVault modules.
//!
//! This module provides the error taxonomy every layer reports through,
//! the identifiers that cross component boundaries, and the retry executor
//! used around idempotent collaborator calls.

pub mod error;
pub mod retry;
pub mod types;

pub use error::{Error, Result};
pub use retry::{RetryConfig, RetryExecutor};
pub use types::{ContentAddress, Identity, SensitiveBytes};
