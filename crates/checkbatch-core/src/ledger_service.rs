use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use checkbatch_domain::{BalanceSnapshot, Book, Ledger, TransactionKind, TransactionRecord};

use crate::{
    balance::{BalanceOracle, LedgerBalance},
    time::Clock,
    CoreError, CoreResult,
};

/// Ledger maintenance outside of batch runs.
pub struct LedgerService;

impl LedgerService {
    pub fn create(book: &mut Book, name: &str, starting_balance: Decimal) -> CoreResult<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("ledger name cannot be empty".into()));
        }
        if book.find_ledger_by_name(name).is_some() {
            return Err(CoreError::Validation(format!(
                "a ledger named `{name}` already exists"
            )));
        }
        let ledger = Ledger::new(name, starting_balance);
        let id = ledger.id;
        book.ledgers.push(ledger);
        if book.active_ledger_id.is_none() {
            book.active_ledger_id = Some(id);
        }
        info!(ledger = %name, %starting_balance, "ledger created");
        Ok(id)
    }

    pub fn set_starting_balance(book: &mut Book, ledger_id: Uuid, amount: Decimal) -> CoreResult<()> {
        let ledger = Self::ledger_mut(book, ledger_id)?;
        if ledger.lock_start {
            return Err(CoreError::InvalidOperation(format!(
                "starting balance of `{}` is locked",
                ledger.name
            )));
        }
        ledger.starting_balance = amount;
        ledger.invalidate_cache();
        Ok(())
    }

    pub fn set_lock(book: &mut Book, ledger_id: Uuid, locked: bool) -> CoreResult<()> {
        Self::ledger_mut(book, ledger_id)?.lock_start = locked;
        Ok(())
    }

    /// Appends a deposit. Amounts must be positive.
    pub fn record_deposit(
        book: &mut Book,
        ledger_id: Uuid,
        date: NaiveDate,
        payee: &str,
        amount: Decimal,
        clock: &dyn Clock,
    ) -> CoreResult<Uuid> {
        if amount <= Decimal::ZERO {
            return Err(CoreError::Validation(
                "deposit amount must be greater than zero".into(),
            ));
        }
        Self::append(book, TransactionKind::Deposit, ledger_id, date, payee, amount, clock)
    }

    /// Appends a zero-amount note that never moves the balance.
    pub fn record_note(
        book: &mut Book,
        ledger_id: Uuid,
        date: NaiveDate,
        text: &str,
        clock: &dyn Clock,
    ) -> CoreResult<Uuid> {
        if text.trim().is_empty() {
            return Err(CoreError::Validation("note text cannot be empty".into()));
        }
        Self::append(
            book,
            TransactionKind::Note,
            ledger_id,
            date,
            text.trim(),
            Decimal::ZERO,
            clock,
        )
    }

    /// Removes a record. The ledger's balance follows from the remaining history.
    pub fn delete_record(book: &mut Book, record_id: Uuid) -> CoreResult<TransactionRecord> {
        let record = book
            .remove_record(record_id)
            .ok_or(CoreError::RecordNotFound(record_id))?;
        info!(record = %record_id, kind = %record.kind, amount = %record.amount, "record deleted");
        Ok(record)
    }

    pub fn balances(book: &Book) -> Vec<LedgerBalance> {
        BalanceOracle::report(book)
    }

    /// History in append order, optionally narrowed to one ledger.
    pub fn history(book: &Book, ledger_id: Option<Uuid>) -> Vec<&TransactionRecord> {
        book.records
            .iter()
            .filter(|record| ledger_id.map_or(true, |id| record.ledger_id == id))
            .collect()
    }

    fn append(
        book: &mut Book,
        kind: TransactionKind,
        ledger_id: Uuid,
        date: NaiveDate,
        payee: &str,
        amount: Decimal,
        clock: &dyn Clock,
    ) -> CoreResult<Uuid> {
        if book.ledger(ledger_id).is_none() {
            return Err(CoreError::LedgerNotFound(ledger_id.to_string()));
        }
        let profile_id = book.active_profile_id.ok_or_else(|| {
            CoreError::Configuration("no active profile is configured".into())
        })?;
        let previous = BalanceOracle::balance(book, ledger_id);
        if BalanceSnapshot::checked_for_kind(kind, previous, amount.abs()).is_none() {
            return Err(CoreError::Validation(format!(
                "{amount} would overflow the balance of ledger {ledger_id}"
            )));
        }
        let record = TransactionRecord::new(
            kind,
            ledger_id,
            profile_id,
            date,
            payee,
            amount,
            previous,
            clock.now(),
        );
        let id = record.id;
        book.records.push(record);
        if let Some(ledger) = book.ledger_mut(ledger_id) {
            ledger.invalidate_cache();
        }
        info!(ledger = %ledger_id, %kind, %amount, "record appended");
        Ok(id)
    }

    fn ledger_mut(book: &mut Book, ledger_id: Uuid) -> CoreResult<&mut Ledger> {
        book.ledger_mut(ledger_id)
            .ok_or_else(|| CoreError::LedgerNotFound(ledger_id.to_string()))
    }
}
