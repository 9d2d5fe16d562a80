//! Batch print orchestration.
//!
//! A [`BatchRun`] walks the queue strictly in order. Each item (standard
//! mode) or sheet of three items (three-up mode) is staged on the print
//! surface, printed through the adapter, and only after a confirmed print
//! does its debit enter the session. A failed print suspends the run in
//! [`RunState::DecisionNeeded`] until the operator answers through
//! [`BatchRun::decide`]. Persisted state changes once, when the walk ends.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use checkbatch_domain::{
    BalanceSnapshot, ImportQueueItem, SheetSlot, TransactionKind, TransactionRecord,
};

use crate::{
    commit::{commit_session, BatchSummary},
    dates::normalize_date,
    print::{
        validate_delivery, CheckFace, PrintAdapter, PrintError, PrintJob, PrintSurface,
        PrintableState,
    },
    repository::LedgerRepository,
    session::{BatchMode, BatchOptions, BatchSession, CancelHandle, Progress, SHEET_SIZE},
    time::Clock,
    words::amount_in_words,
    CoreError, CoreResult,
};

/// Operator answer to a print failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorDecision {
    /// Stop the batch; nothing further prints and the failed item is not charged.
    Abort,
    /// Leave the failed item uncharged and continue with the next one.
    Skip,
}

/// Identity of one check caught in a failed print call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub queue_index: usize,
    pub payee: String,
    pub amount: Decimal,
    pub check_number: Option<u64>,
    pub slot: Option<SheetSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintFailure {
    pub target: String,
    pub items: Vec<FailedItem>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// A print failed; call [`BatchRun::decide`] before advancing again.
    DecisionNeeded(PrintFailure),
    /// The walk ended and the session was committed.
    Finished(BatchSummary),
}

/// Asks the operator what to do about a print failure.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    async fn decide(&self, failure: &PrintFailure) -> OperatorDecision;
}

/// Collaborators shared by every run.
#[derive(Clone)]
pub struct BatchEngine {
    repository: Arc<dyn LedgerRepository>,
    adapter: Arc<dyn PrintAdapter>,
    surface: Arc<dyn PrintSurface>,
    clock: Arc<dyn Clock>,
}

impl BatchEngine {
    pub fn new(
        repository: Arc<dyn LedgerRepository>,
        adapter: Arc<dyn PrintAdapter>,
        surface: Arc<dyn PrintSurface>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            adapter,
            surface,
            clock,
        }
    }

    /// Validates the delivery settings and the active profile, then returns
    /// a run positioned before the first queue item.
    pub async fn prepare(
        &self,
        options: BatchOptions,
        queue: Vec<ImportQueueItem>,
    ) -> CoreResult<BatchRun> {
        validate_delivery(&options.delivery, self.adapter.as_ref()).await?;
        let profile = self
            .repository
            .profile(options.profile_id)?
            .ok_or_else(|| {
                CoreError::Configuration(format!(
                    "active profile {} not found",
                    options.profile_id
                ))
            })?;
        let start_number = options.start_number.unwrap_or(profile.next_check_number);
        let span = queue.len() as u64;
        if start_number.checked_add(span).is_none()
            || profile.next_check_number.checked_add(span).is_none()
        {
            return Err(CoreError::Configuration(format!(
                "check numbers starting at {start_number} run out before {span} checks"
            )));
        }
        let session = BatchSession::new(
            options.mode,
            queue.len(),
            options.auto_number,
            start_number,
            profile.next_check_number,
        );
        info!(
            mode = ?options.mode,
            delivery = %options.delivery,
            items = queue.len(),
            auto_number = options.auto_number,
            start_number,
            "batch prepared"
        );
        Ok(BatchRun {
            engine: self.clone(),
            options,
            queue,
            cursor: 0,
            session,
            phase: Phase::Ready,
            pending_failure: None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    AwaitingDecision,
    Committed,
}

#[derive(Debug, Clone, Copy)]
struct PendingFailure {
    resume_at: usize,
    filled: usize,
}

enum Step {
    Continue,
    Failed(PrintFailure),
}

/// A checked item waiting for its print call to succeed.
struct StagedCheck {
    queue_index: usize,
    slot: Option<SheetSlot>,
    ledger_id: Uuid,
    amount: Decimal,
    face: CheckFace,
    item: ImportQueueItem,
}

impl StagedCheck {
    fn failed_item(&self) -> FailedItem {
        FailedItem {
            queue_index: self.queue_index,
            payee: self.face.payee.clone(),
            amount: self.amount,
            check_number: self.face.check_number,
            slot: self.slot,
        }
    }
}

pub struct BatchRun {
    engine: BatchEngine,
    options: BatchOptions,
    queue: Vec<ImportQueueItem>,
    cursor: usize,
    session: BatchSession,
    phase: Phase,
    pending_failure: Option<PendingFailure>,
}

impl BatchRun {
    pub fn progress(&self) -> Progress {
        self.session.progress
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.session.cancel.clone()
    }

    pub fn is_committed(&self) -> bool {
        self.phase == Phase::Committed
    }

    /// Runs until the operator must decide about a failed print or the walk
    /// ends. Ending the walk commits the session exactly once.
    pub async fn advance(&mut self) -> CoreResult<RunState> {
        match self.phase {
            Phase::AwaitingDecision => {
                return Err(CoreError::InvalidOperation(
                    "a print failure is awaiting an operator decision".into(),
                ))
            }
            Phase::Committed => {
                return Err(CoreError::InvalidOperation(
                    "batch has already been committed".into(),
                ))
            }
            Phase::Ready => {}
        }

        loop {
            if self.session.is_cancelled() || self.cursor >= self.queue.len() {
                return self.finish().map(RunState::Finished);
            }
            let step = match self.options.mode {
                BatchMode::Standard => self.print_single().await?,
                BatchMode::ThreeUp => self.print_sheet().await?,
            };
            if let Step::Failed(failure) = step {
                self.phase = Phase::AwaitingDecision;
                return Ok(RunState::DecisionNeeded(failure));
            }
        }
    }

    /// Feeds the operator's answer to the pending failure.
    pub fn decide(&mut self, decision: OperatorDecision) -> CoreResult<()> {
        let pending = self.pending_failure.take().ok_or_else(|| {
            CoreError::InvalidOperation("no print failure is awaiting a decision".into())
        })?;
        match decision {
            OperatorDecision::Abort => {
                info!("operator aborted the batch");
                self.session.cancel.cancel();
            }
            OperatorDecision::Skip => {
                info!(count = pending.filled, "operator skipped failed checks");
                self.session.failed += pending.filled;
            }
        }
        let consumed = pending.resume_at - self.cursor;
        self.cursor = pending.resume_at;
        self.session.advance(consumed);
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Advances to completion, asking `prompt` for every print failure.
    pub async fn drive(&mut self, prompt: &dyn OperatorPrompt) -> CoreResult<BatchSummary> {
        loop {
            match self.advance().await? {
                RunState::Finished(summary) => return Ok(summary),
                RunState::DecisionNeeded(failure) => {
                    let decision = prompt.decide(&failure).await;
                    self.decide(decision)?;
                }
            }
        }
    }

    async fn print_single(&mut self) -> CoreResult<Step> {
        let index = self.cursor;
        let item = self.queue[index].clone();
        let Some(amount) = item.payable_amount() else {
            self.skip_invalid(index);
            self.cursor += 1;
            self.session.advance(1);
            return Ok(Step::Continue);
        };

        let ledger_id = self.session.resolve_ledger(
            self.engine.repository.as_ref(),
            &item,
            self.options.default_ledger,
        )?;
        let previous = self
            .session
            .local_balance(self.engine.repository.as_ref(), ledger_id)?;
        let check_number = self.session.check_number_for(&item, 0);
        let Some(staged) =
            self.stage_check(index, None, item, ledger_id, amount, previous, check_number)
        else {
            self.skip_invalid(index);
            self.cursor += 1;
            self.session.advance(1);
            return Ok(Step::Continue);
        };
        let target = match check_number {
            Some(number) => format!("check-{number}"),
            None => format!("check-item-{}", index + 1),
        };

        self.engine
            .surface
            .stage(PrintableState::Single(staged.face.clone()));
        if let Err(err) = self.deliver(&target).await {
            warn!(%target, error = %err, payee = %staged.face.payee, "check failed to print");
            self.pending_failure = Some(PendingFailure {
                resume_at: index + 1,
                filled: 1,
            });
            return Ok(Step::Failed(PrintFailure {
                target,
                items: vec![staged.failed_item()],
                error: err.message,
            }));
        }

        self.wait(self.options.spool_delay).await;
        let timestamp = self.engine.clock.now();
        self.session
            .balances
            .insert(ledger_id, staged.face.snapshot.new_balance);
        let record = self.record_for(&staged, timestamp);
        debug!(%target, record = %record.id, "check recorded");
        self.session.pending.push(record);
        self.session.record_printed(1);
        self.cursor += 1;
        self.session.advance(1);
        Ok(Step::Continue)
    }

    async fn print_sheet(&mut self) -> CoreResult<Step> {
        let start = self.cursor;
        let end = (start + SHEET_SIZE).min(self.queue.len());
        let sheet_number = start / SHEET_SIZE + 1;

        // Deductions staged by earlier slots of this sheet; discarded on failure.
        let mut staged_balances: HashMap<Uuid, Decimal> = HashMap::new();
        let mut slots: [Option<CheckFace>; SHEET_SIZE] = [None, None, None];
        let mut staged: Vec<StagedCheck> = Vec::new();

        for (position, index) in (start..end).enumerate() {
            let item = self.queue[index].clone();
            let Some(amount) = item.payable_amount() else {
                self.skip_invalid(index);
                continue;
            };
            let ledger_id = self.session.resolve_ledger(
                self.engine.repository.as_ref(),
                &item,
                self.options.default_ledger,
            )?;
            let previous = match staged_balances.get(&ledger_id) {
                Some(balance) => *balance,
                None => self
                    .session
                    .local_balance(self.engine.repository.as_ref(), ledger_id)?,
            };
            let check_number = self.session.check_number_for(&item, staged.len() as u64);
            let Some(check) = self.stage_check(
                index,
                SheetSlot::from_index(position),
                item,
                ledger_id,
                amount,
                previous,
                check_number,
            ) else {
                self.skip_invalid(index);
                continue;
            };
            staged_balances.insert(ledger_id, check.face.snapshot.new_balance);
            slots[position] = Some(check.face.clone());
            staged.push(check);
        }

        if staged.is_empty() {
            debug!(sheet = sheet_number, "sheet has no printable checks");
            self.cursor = end;
            self.session.advance(end - start);
            return Ok(Step::Continue);
        }

        let target = format!("sheet-{sheet_number}");
        self.engine.surface.stage(PrintableState::Sheet(slots));
        if let Err(err) = self.deliver(&target).await {
            warn!(
                %target,
                error = %err,
                checks = staged.len(),
                "sheet failed to print; staged deductions discarded"
            );
            self.pending_failure = Some(PendingFailure {
                resume_at: end,
                filled: staged.len(),
            });
            return Ok(Step::Failed(PrintFailure {
                target,
                items: staged.iter().map(StagedCheck::failed_item).collect(),
                error: err.message,
            }));
        }

        self.wait(self.options.spool_delay).await;
        let timestamp = self.engine.clock.now();
        for check in &staged {
            let record = self.record_for(check, timestamp);
            self.session.pending.push(record);
        }
        self.session.balances.extend(staged_balances);
        self.session.record_printed(staged.len());
        debug!(%target, checks = staged.len(), "sheet recorded");
        self.cursor = end;
        self.session.advance(end - start);
        Ok(Step::Continue)
    }

    #[allow(clippy::too_many_arguments)]
    fn stage_check(
        &self,
        queue_index: usize,
        slot: Option<SheetSlot>,
        item: ImportQueueItem,
        ledger_id: Uuid,
        amount: Decimal,
        previous: Decimal,
        check_number: Option<u64>,
    ) -> Option<StagedCheck> {
        let Some(snapshot) = BalanceSnapshot::checked_debit(previous, amount) else {
            warn!(queue_index, %previous, %amount, "check would overflow the ledger balance");
            return None;
        };
        let date = normalize_date(&item.date, self.engine.clock.today());
        let details = item.details();
        let face = CheckFace {
            ledger_id,
            check_number,
            date,
            payee: item.payee.trim().to_string(),
            amount,
            amount_words: amount_in_words(amount),
            memo: details.memo,
            address: details.address,
            snapshot,
        };
        Some(StagedCheck {
            queue_index,
            slot,
            ledger_id,
            amount,
            face,
            item,
        })
    }

    fn record_for(&self, check: &StagedCheck, timestamp: DateTime<Utc>) -> TransactionRecord {
        let record = TransactionRecord::new(
            TransactionKind::Check,
            check.ledger_id,
            self.options.profile_id,
            check.face.date,
            check.face.payee.clone(),
            check.amount,
            check.face.snapshot.previous_balance,
            timestamp,
        )
        .with_check_number(check.face.check_number)
        .with_details(check.item.details());
        match check.slot {
            Some(slot) => record.with_sheet_slot(slot),
            None => record,
        }
    }

    fn skip_invalid(&mut self, index: usize) {
        debug!(queue_index = index, "skipping invalid queue item");
        self.session.skipped += 1;
    }

    /// Lets the staged surface settle, then hands the rendered state to the adapter.
    async fn deliver(&self, target: &str) -> Result<(), PrintError> {
        self.wait(self.options.settle_delay).await;
        let surface = self
            .engine
            .surface
            .current()
            .ok_or_else(|| PrintError::new("print surface has nothing staged"))?;
        let job = PrintJob {
            mode: self.options.delivery.clone(),
            target: target.to_string(),
            surface,
        };
        self.engine.adapter.deliver(&job).await
    }

    async fn wait(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn finish(&mut self) -> CoreResult<BatchSummary> {
        let summary = commit_session(
            &mut self.session,
            self.options.profile_id,
            self.engine.repository.as_ref(),
            self.engine.surface.as_ref(),
        )?;
        self.queue.clear();
        self.cursor = 0;
        self.phase = Phase::Committed;
        Ok(summary)
    }
}
