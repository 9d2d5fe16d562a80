//! checkbatch-domain
//!
//! Pure domain models (Ledger, TransactionRecord, ImportQueueItem, Profile, Book).
//! No I/O, no printing, no storage. Only data types and core enums.

pub mod book;
pub mod common;
pub mod ledger;
pub mod profile;
pub mod queue;
pub mod record;

pub use book::*;
pub use common::*;
pub use ledger::*;
pub use profile::*;
pub use queue::*;
pub use record::*;
