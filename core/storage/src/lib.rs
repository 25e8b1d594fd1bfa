//! Content-addressed store clients for ChainVault.
//!
//! This module provides a trait-based interface over content-addressed
//! blob stores (an IPFS pinning gateway, a local directory, memory) and a
//! registry for resolving a store from configuration.
//!
//! # Design Principles
//! - Opaque bytes: stores never inspect or decrypt what they hold
//! - Async operations: all I/O operations are async
//! - Unified error semantics: transient failures (`Network`, `Io`) are kept
//!   apart from terminal ones (`Rejected`, `NotFound`)

pub mod address;
pub mod local;
pub mod memory;
pub mod pinata;
pub mod provider;
pub mod registry;

pub use address::content_address_for;
pub use local::LocalContentStore;
pub use memory::MemoryContentStore;
pub use pinata::{PinataConfig, PinataGateway};
pub use provider::ContentStore;
pub use registry::{create_default_registry, StoreFactory, StoreRegistry};
