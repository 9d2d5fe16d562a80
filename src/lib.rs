//! checkbatch batch-prints queued checks and keeps the ledgers they are
//! drawn on. This crate hosts the command-line front end; the engine lives
//! in `checkbatch-core`.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("checkbatch tracing initialized");
    });
}
