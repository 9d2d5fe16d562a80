//! Read/commit boundary between the batch engine and persisted state.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use checkbatch_domain::{Book, Ledger, Profile, TransactionRecord};

use crate::{balance::BalanceOracle, CoreError, CoreResult};

/// Everything a batch run produced, written in one call.
#[derive(Debug, Clone, Default)]
pub struct BatchCommit {
    pub new_ledgers: Vec<Ledger>,
    /// Final session-local balance of every ledger the run touched.
    pub balances: HashMap<Uuid, Decimal>,
    pub records: Vec<TransactionRecord>,
    pub profile_id: Uuid,
    pub next_check_number: u64,
}

/// Persisted ledger state as seen by the orchestrator.
///
/// Reads may be called any number of times during a run; `commit_batch` is
/// the only write and is called once per run.
pub trait LedgerRepository: Send + Sync {
    fn find_ledger_by_name(&self, name: &str) -> CoreResult<Option<Ledger>>;
    fn current_balance(&self, ledger_id: Uuid) -> CoreResult<Decimal>;
    fn profile(&self, id: Uuid) -> CoreResult<Option<Profile>>;
    fn commit_batch(&self, commit: BatchCommit) -> CoreResult<()>;
}

/// Applies a batch commit to a book.
///
/// New ledgers are merged, records appended in order, touched ledgers get
/// their cache refreshed from the oracle, the profile counter moves and the
/// queue is emptied. The book is untouched when the profile is unknown.
pub fn apply_commit(book: &mut Book, commit: BatchCommit) -> CoreResult<()> {
    let BatchCommit {
        new_ledgers,
        balances,
        records,
        profile_id,
        next_check_number,
    } = commit;

    if book.profile(profile_id).is_none() {
        return Err(CoreError::ProfileNotFound(profile_id));
    }

    for ledger in new_ledgers {
        if book.ledger(ledger.id).is_none() {
            debug!(ledger = %ledger.name, id = %ledger.id, "merging provisioned ledger");
            book.ledgers.push(ledger);
        }
    }

    book.records.extend(records);

    let mut touched: Vec<_> = balances.into_iter().collect();
    touched.sort_by_key(|(id, _)| *id);
    for (ledger_id, local) in touched {
        let derived = BalanceOracle::balance(book, ledger_id);
        if derived != local {
            warn!(
                ledger = %ledger_id,
                %local,
                %derived,
                "session balance disagrees with derived balance; keeping derived"
            );
        }
        if let Some(ledger) = book.ledger_mut(ledger_id) {
            ledger.balance_cache = Some(derived);
        }
    }

    if let Some(profile) = book.profile_mut(profile_id) {
        profile.next_check_number = next_check_number;
    }
    book.queue.clear();
    Ok(())
}

/// Process-local repository, used by tests and as the working copy behind
/// file-backed stores.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    book: Mutex<Book>,
}

impl MemoryRepository {
    pub fn new(book: Book) -> Self {
        Self {
            book: Mutex::new(book),
        }
    }

    /// Clone of the current book.
    pub fn snapshot(&self) -> CoreResult<Book> {
        Ok(self.lock()?.clone())
    }

    /// Runs `mutator` against the book outside of a batch run.
    pub fn update<T, F>(&self, mutator: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Book) -> CoreResult<T>,
    {
        let mut guard = self.lock()?;
        mutator(&mut guard)
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, Book>> {
        self.book
            .lock()
            .map_err(|_| CoreError::Storage("book lock poisoned".into()))
    }
}

impl LedgerRepository for MemoryRepository {
    fn find_ledger_by_name(&self, name: &str) -> CoreResult<Option<Ledger>> {
        Ok(self.lock()?.find_ledger_by_name(name).cloned())
    }

    fn current_balance(&self, ledger_id: Uuid) -> CoreResult<Decimal> {
        let book = self.lock()?;
        Ok(BalanceOracle::balance(&book, ledger_id))
    }

    fn profile(&self, id: Uuid) -> CoreResult<Option<Profile>> {
        Ok(self.lock()?.profile(id).cloned())
    }

    fn commit_batch(&self, commit: BatchCommit) -> CoreResult<()> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        apply_commit(&mut staged, commit)?;
        *guard = staged;
        Ok(())
    }
}
