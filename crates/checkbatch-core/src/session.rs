//! Per-run state of a batch: options, progress, local balances and history.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use rust_decimal::Decimal;
use uuid::Uuid;

use checkbatch_domain::{ImportQueueItem, TransactionRecord};

use crate::{print::DeliveryMode, repository::LedgerRepository, router::LedgerRouter, CoreResult};

/// Wait between staging a surface and asking the host to print it.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(350);
/// Wait after a confirmed print before the debit becomes visible.
pub const DEFAULT_SPOOL_DELAY: Duration = Duration::from_millis(1200);
/// Checks per physical sheet in three-up mode.
pub const SHEET_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// One check per page, one print call per check.
    #[default]
    Standard,
    /// Three checks per sheet, one print call per sheet.
    ThreeUp,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub mode: BatchMode,
    pub delivery: DeliveryMode,
    pub auto_number: bool,
    /// First number to hand out; defaults to the profile's next check number.
    pub start_number: Option<u64>,
    pub profile_id: Uuid,
    /// Ledger used for rows that do not name one.
    pub default_ledger: Uuid,
    pub settle_delay: Duration,
    pub spool_delay: Duration,
}

impl BatchOptions {
    pub fn new(profile_id: Uuid, default_ledger: Uuid, delivery: DeliveryMode) -> Self {
        Self {
            mode: BatchMode::Standard,
            delivery,
            auto_number: true,
            start_number: None,
            profile_id,
            default_ledger,
            settle_delay: DEFAULT_SETTLE_DELAY,
            spool_delay: DEFAULT_SPOOL_DELAY,
        }
    }

    pub fn with_mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_auto_number(mut self, enabled: bool, start_number: Option<u64>) -> Self {
        self.auto_number = enabled;
        self.start_number = start_number;
        self
    }

    pub fn with_delays(mut self, settle: Duration, spool: Duration) -> Self {
        self.settle_delay = settle;
        self.spool_delay = spool;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// Cooperative cancellation flag, observed only between queue items.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct BatchSession {
    pub mode: BatchMode,
    pub cancel: CancelHandle,
    pub progress: Progress,
    pub auto_number: bool,
    pub start_number: u64,
    /// Running counter; only moves on confirmed prints with auto-numbering on.
    pub next_number: u64,
    /// Profile counter at the start of the run.
    pub profile_next_number: u64,
    pub router: LedgerRouter,
    pub balances: HashMap<Uuid, Decimal>,
    pub pending: Vec<TransactionRecord>,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSession {
    pub fn new(
        mode: BatchMode,
        total: usize,
        auto_number: bool,
        start_number: u64,
        profile_next_number: u64,
    ) -> Self {
        Self {
            mode,
            cancel: CancelHandle::default(),
            progress: Progress { current: 0, total },
            auto_number,
            start_number,
            next_number: start_number,
            profile_next_number,
            router: LedgerRouter::new(),
            balances: HashMap::new(),
            pending: Vec::new(),
            processed: 0,
            failed: 0,
            skipped: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves the ledger for a row and seeds freshly provisioned ledgers at zero.
    pub fn resolve_ledger(
        &mut self,
        repository: &dyn LedgerRepository,
        item: &ImportQueueItem,
        default_ledger: Uuid,
    ) -> CoreResult<Uuid> {
        let resolution = self
            .router
            .resolve(repository, item.ledger(), default_ledger)?;
        if resolution.provisioned {
            self.balances.insert(resolution.ledger_id, Decimal::ZERO);
        }
        Ok(resolution.ledger_id)
    }

    /// Session-local balance, falling back to the persisted derived balance
    /// the first time a ledger is touched.
    pub fn local_balance(
        &self,
        repository: &dyn LedgerRepository,
        ledger_id: Uuid,
    ) -> CoreResult<Decimal> {
        match self.balances.get(&ledger_id) {
            Some(balance) => Ok(*balance),
            None => repository.current_balance(ledger_id),
        }
    }

    /// Number for the `offset`-th check of the current print call.
    pub fn check_number_for(&self, item: &ImportQueueItem, offset: u64) -> Option<u64> {
        if self.auto_number {
            Some(self.next_number.saturating_add(offset))
        } else {
            item.declared_check_number()
        }
    }

    pub fn record_printed(&mut self, count: usize) {
        self.processed += count;
        if self.auto_number {
            self.next_number = self.next_number.saturating_add(count as u64);
        }
    }

    pub fn advance(&mut self, count: usize) {
        self.progress.current = (self.progress.current + count).min(self.progress.total);
    }

    /// Value the profile counter takes at commit.
    pub fn committed_next_number(&self) -> u64 {
        let base = if self.auto_number {
            self.start_number
        } else {
            self.profile_next_number
        };
        base.saturating_add(self.processed as u64)
    }
}
