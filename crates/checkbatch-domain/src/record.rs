//! Append-only transaction records and their balance snapshots.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Check,
    Deposit,
    Note,
}

impl TransactionKind {
    /// Signed effect of `amount` on a ledger balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Check => -amount,
            TransactionKind::Deposit => amount,
            TransactionKind::Note => Decimal::ZERO,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Check => "check",
            TransactionKind::Deposit => "deposit",
            TransactionKind::Note => "note",
        };
        f.write_str(label)
    }
}

/// Position of a check on a three-up sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SheetSlot {
    Top,
    Middle,
    Bottom,
}

impl SheetSlot {
    pub const ALL: [SheetSlot; 3] = [SheetSlot::Top, SheetSlot::Middle, SheetSlot::Bottom];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            SheetSlot::Top => 0,
            SheetSlot::Middle => 1,
            SheetSlot::Bottom => 2,
        }
    }
}

impl fmt::Display for SheetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SheetSlot::Top => "top",
            SheetSlot::Middle => "middle",
            SheetSlot::Bottom => "bottom",
        };
        f.write_str(label)
    }
}

/// Balance triple captured when a record is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub previous_balance: Decimal,
    pub transaction_amount: Decimal,
    pub new_balance: Decimal,
}

impl BalanceSnapshot {
    /// Snapshot for a record of `kind`. The new balance saturates at the
    /// `Decimal` bounds; use [`BalanceSnapshot::checked_for_kind`] to detect that.
    pub fn for_kind(kind: TransactionKind, previous_balance: Decimal, amount: Decimal) -> Self {
        Self {
            previous_balance,
            transaction_amount: amount,
            new_balance: previous_balance.saturating_add(kind.signed(amount)),
        }
    }

    /// Like [`BalanceSnapshot::for_kind`], or `None` when the new balance
    /// is not representable.
    pub fn checked_for_kind(
        kind: TransactionKind,
        previous_balance: Decimal,
        amount: Decimal,
    ) -> Option<Self> {
        let new_balance = previous_balance.checked_add(kind.signed(amount))?;
        Some(Self {
            previous_balance,
            transaction_amount: amount,
            new_balance,
        })
    }

    pub fn debit(previous_balance: Decimal, amount: Decimal) -> Self {
        Self::for_kind(TransactionKind::Check, previous_balance, amount)
    }

    pub fn checked_debit(previous_balance: Decimal, amount: Decimal) -> Option<Self> {
        Self::checked_for_kind(TransactionKind::Check, previous_balance, amount)
    }

    pub fn credit(previous_balance: Decimal, amount: Decimal) -> Self {
        Self::for_kind(TransactionKind::Deposit, previous_balance, amount)
    }
}

/// Free-text fields that ride along with a record without affecting economics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gl_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gl_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Immutable history entry. Deletion is the only supported mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub payee: String,
    pub amount: Decimal,
    pub ledger_id: Uuid,
    pub profile_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_number: Option<u64>,
    #[serde(flatten)]
    pub details: RecordDetails,
    pub snapshot: BalanceSnapshot,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_slot: Option<SheetSlot>,
}

impl TransactionRecord {
    /// Builds a record whose snapshot follows the kind's balance rule.
    ///
    /// The amount is stored as its absolute value.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: TransactionKind,
        ledger_id: Uuid,
        profile_id: Uuid,
        date: NaiveDate,
        payee: impl Into<String>,
        amount: Decimal,
        previous_balance: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let amount = amount.abs();
        Self {
            id: Uuid::new_v4(),
            kind,
            date,
            payee: payee.into(),
            amount,
            ledger_id,
            profile_id,
            check_number: None,
            details: RecordDetails::default(),
            snapshot: BalanceSnapshot::for_kind(kind, previous_balance, amount),
            timestamp,
            sheet_slot: None,
        }
    }

    pub fn with_check_number(mut self, number: Option<u64>) -> Self {
        self.check_number = number;
        self
    }

    pub fn with_details(mut self, details: RecordDetails) -> Self {
        self.details = details;
        self
    }

    pub fn with_sheet_slot(mut self, slot: SheetSlot) -> Self {
        self.sheet_slot = Some(slot);
        self
    }

    /// Signed contribution of this record to its ledger balance.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

impl Identifiable for TransactionRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}
