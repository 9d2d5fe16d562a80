//! Derived ledger balances.

use rust_decimal::Decimal;
use uuid::Uuid;

use checkbatch_domain::{Book, TransactionKind, TransactionRecord};

/// Balance line for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerBalance {
    pub ledger_id: Uuid,
    pub name: String,
    pub starting_balance: Decimal,
    pub balance: Decimal,
    pub record_count: usize,
}

/// Computes spendable balances from starting balance plus signed history.
///
/// Nothing is cached between calls; deleting a record is immediately
/// reflected in the next answer.
pub struct BalanceOracle;

impl BalanceOracle {
    /// `starting + Σ deposits − Σ checks` over the records of `ledger_id`,
    /// saturating at the `Decimal` bounds.
    pub fn balance_from<'a, I>(starting_balance: Decimal, ledger_id: Uuid, records: I) -> Decimal
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        records
            .into_iter()
            .filter(|record| record.ledger_id == ledger_id)
            .fold(starting_balance, |total, record| match record.kind {
                TransactionKind::Deposit => total.saturating_add(record.amount),
                TransactionKind::Check => total.saturating_sub(record.amount),
                TransactionKind::Note => total,
            })
    }

    /// Balance of a ledger in `book`. Unknown ledgers start from zero.
    pub fn balance(book: &Book, ledger_id: Uuid) -> Decimal {
        let starting = book
            .ledger(ledger_id)
            .map(|ledger| ledger.starting_balance)
            .unwrap_or(Decimal::ZERO);
        Self::balance_from(starting, ledger_id, &book.records)
    }

    pub fn report(book: &Book) -> Vec<LedgerBalance> {
        book.ledgers
            .iter()
            .map(|ledger| LedgerBalance {
                ledger_id: ledger.id,
                name: ledger.name.clone(),
                starting_balance: ledger.starting_balance,
                balance: Self::balance_from(ledger.starting_balance, ledger.id, &book.records),
                record_count: book.records_for(ledger.id).count(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkbatch_domain::{Ledger, Profile};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn record(kind: TransactionKind, ledger_id: Uuid, amount: Decimal) -> TransactionRecord {
        TransactionRecord::new(
            kind,
            ledger_id,
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            "Payee",
            amount,
            Decimal::ZERO,
            Utc::now(),
        )
    }

    fn seeded_book() -> (Book, Uuid) {
        let ledger = Ledger::new("Operating", dec!(500.00));
        let id = ledger.id;
        let mut book = Book::with_defaults(Profile::new("Main"), ledger);
        book.records.push(record(TransactionKind::Check, id, dec!(120.00)));
        book.records.push(record(TransactionKind::Deposit, id, dec!(80.50)));
        book.records.push(record(TransactionKind::Note, id, dec!(999.00)));
        book.records.push(record(TransactionKind::Check, id, dec!(60.25)));
        book.records
            .push(record(TransactionKind::Check, Uuid::new_v4(), dec!(10.00)));
        (book, id)
    }

    #[test]
    fn balance_is_start_plus_deposits_minus_checks() {
        let (book, id) = seeded_book();
        assert_eq!(BalanceOracle::balance(&book, id), dec!(400.25));
    }

    #[test]
    fn balance_without_history_is_starting_balance() {
        let ledger = Ledger::new("Empty", dec!(42.00));
        let id = ledger.id;
        let book = Book::with_defaults(Profile::new("Main"), ledger);
        assert_eq!(BalanceOracle::balance(&book, id), dec!(42.00));
    }

    #[test]
    fn deleting_any_subset_keeps_the_formula() {
        let (book, id) = seeded_book();
        let ids: Vec<Uuid> = book.records.iter().map(|record| record.id).collect();
        for mask in 0u32..(1 << ids.len()) {
            let mut trimmed = book.clone();
            for (bit, record_id) in ids.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    trimmed.remove_record(*record_id);
                }
            }
            let expected = trimmed
                .records_for(id)
                .fold(dec!(500.00), |total, record| total + record.signed_amount());
            assert_eq!(BalanceOracle::balance(&trimmed, id), expected);
        }
    }

    #[test]
    fn unknown_ledger_starts_from_zero() {
        let (book, _) = seeded_book();
        let orphan = book.records.last().unwrap().ledger_id;
        assert_eq!(BalanceOracle::balance(&book, orphan), dec!(-10.00));
    }

    #[test]
    fn extreme_history_saturates_instead_of_overflowing() {
        let ledger = Ledger::new("Huge", Decimal::ZERO);
        let id = ledger.id;
        let mut book = Book::with_defaults(Profile::new("Main"), ledger);
        book.records.push(record(TransactionKind::Check, id, Decimal::MAX));
        book.records.push(record(TransactionKind::Check, id, Decimal::MAX));
        assert_eq!(BalanceOracle::balance(&book, id), Decimal::MIN);
    }

    #[test]
    fn report_lists_every_ledger() {
        let (book, id) = seeded_book();
        let report = BalanceOracle::report(&book);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].ledger_id, id);
        assert_eq!(report[0].record_count, 4);
        assert_eq!(report[0].balance, dec!(400.25));
    }
}
