//! Final flush of a batch session into the repository.

use std::mem;

use tracing::info;
use uuid::Uuid;

use crate::{
    print::PrintSurface,
    repository::{BatchCommit, LedgerRepository},
    session::BatchSession,
    CoreResult,
};

/// Outcome reported to the operator once a run is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Checks that printed and were recorded.
    pub processed: usize,
    /// Queue length.
    pub total: usize,
    pub cancelled: bool,
    /// Checks the operator skipped after a print failure.
    pub failed: usize,
    /// Rows dropped by validation.
    pub skipped: usize,
    pub record_ids: Vec<Uuid>,
    pub next_check_number: u64,
}

/// Writes provisioned ledgers, balances and pending records in one repository
/// call, then clears the surface.
///
/// The session keeps its pending history when the repository refuses the
/// commit, so the caller may retry.
pub fn commit_session(
    session: &mut BatchSession,
    profile_id: Uuid,
    repository: &dyn LedgerRepository,
    surface: &dyn PrintSurface,
) -> CoreResult<BatchSummary> {
    let next_check_number = session.committed_next_number();
    let record_ids: Vec<Uuid> = session.pending.iter().map(|record| record.id).collect();
    let commit = BatchCommit {
        new_ledgers: session.router.provisioned().to_vec(),
        balances: session.balances.clone(),
        records: session.pending.clone(),
        profile_id,
        next_check_number,
    };
    repository.commit_batch(commit)?;

    session.pending.clear();
    let provisioned = mem::take(&mut session.router).into_provisioned().len();
    surface.reset();

    let summary = BatchSummary {
        processed: session.processed,
        total: session.progress.total,
        cancelled: session.is_cancelled(),
        failed: session.failed,
        skipped: session.skipped,
        record_ids,
        next_check_number,
    };
    info!(
        processed = summary.processed,
        total = summary.total,
        failed = summary.failed,
        skipped = summary.skipped,
        cancelled = summary.cancelled,
        provisioned,
        next_check_number,
        "batch committed"
    );
    Ok(summary)
}
