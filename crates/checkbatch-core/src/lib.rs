//! checkbatch-core
//!
//! Balance derivation, ledger routing and the batch print engine.
//! Depends on checkbatch-domain. No terminal I/O; storage and printing are
//! reached through the repository and adapter traits.

pub mod balance;
pub mod commit;
pub mod dates;
pub mod error;
pub mod ledger_service;
pub mod orchestrator;
pub mod print;
pub mod repository;
pub mod router;
pub mod session;
pub mod time;
pub mod words;

pub use balance::*;
pub use commit::*;
pub use error::{CoreError, CoreResult};
pub use ledger_service::*;
pub use orchestrator::*;
pub use print::*;
pub use repository::*;
pub use router::*;
pub use session::*;
pub use time::*;
