//! Reference ledger clients for ChainVault.
//!
//! The ledger is the durable, owner-scoped index of everything a user has
//! stored: each record binds a content address to descriptive metadata and
//! a timestamp. It is also the source of login nonces.
//!
//! # Guarantees
//! - Per-identity isolation: no call reads or mutates another identity's records
//! - Insertion order is stable; removal keeps the relative order of the rest
//! - The ledger alone maps indexes to records; stale indexes fail with `OutOfRange`
//!
//! # Index space
//! Credentials and documents share one list per identity, told apart by
//! [`RecordKind`]. An index therefore addresses a record of either kind,
//! and removing a credential shifts the documents stored after it too.
//! Ledgers that keep a separate list per kind (with their own `get`/`delete`
//! calls for each) need an adapter that merges both lists into this single
//! ordering and translates indexes back to the per-kind list.

pub mod ledger;
pub mod local;
pub mod memory;
pub mod record;
pub mod registry;
mod state;

pub use ledger::ReferenceLedger;
pub use local::LocalLedger;
pub use memory::MemoryLedger;
pub use record::{LedgerRecord, NewRecord, RecordKind};
pub use registry::{create_default_registry, LedgerFactory, LedgerRegistry};
