use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Identifiable, NamedEntity};

/// A bank ledger that checks are drawn against.
///
/// The spendable balance is derived from `starting_balance` and the record
/// history. `balance_cache` only mirrors the last derived value written at
/// commit time and is cleared whenever the history changes elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    pub starting_balance: Decimal,
    #[serde(default)]
    pub lock_start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_cache: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Ledger {
    /// Creates an unlocked ledger with the supplied opening balance.
    pub fn new(name: impl Into<String>, starting_balance: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            starting_balance,
            lock_start: false,
            balance_cache: None,
            created_at: Utc::now(),
        }
    }

    /// Ledger provisioned on the fly for a name first seen in a batch.
    pub fn provisioned(name: &str) -> Self {
        Self::new(name.trim(), Decimal::ZERO)
    }

    pub fn invalidate_cache(&mut self) {
        self.balance_cache = None;
    }
}

impl Identifiable for Ledger {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Ledger {
    fn name(&self) -> &str {
        &self.name
    }
}
