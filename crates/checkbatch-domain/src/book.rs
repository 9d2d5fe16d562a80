//! The persisted aggregate: ledgers, history, profiles and the pending queue.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::name_key, ledger::Ledger, profile::Profile, queue::ImportQueueItem,
    record::TransactionRecord,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub ledgers: Vec<Ledger>,
    #[serde(default)]
    pub records: Vec<TransactionRecord>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_ledger_id: Option<Uuid>,
    #[serde(default)]
    pub queue: Vec<ImportQueueItem>,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            ledgers: Vec::new(),
            records: Vec::new(),
            profiles: Vec::new(),
            active_profile_id: None,
            active_ledger_id: None,
            queue: Vec::new(),
        }
    }
}

impl Book {
    /// Book seeded with one profile and one ledger, both marked active.
    pub fn with_defaults(profile: Profile, ledger: Ledger) -> Self {
        let mut book = Self::default();
        book.active_profile_id = Some(profile.id);
        book.active_ledger_id = Some(ledger.id);
        book.profiles.push(profile);
        book.ledgers.push(ledger);
        book
    }

    pub fn ledger(&self, id: Uuid) -> Option<&Ledger> {
        self.ledgers.iter().find(|ledger| ledger.id == id)
    }

    pub fn ledger_mut(&mut self, id: Uuid) -> Option<&mut Ledger> {
        self.ledgers.iter_mut().find(|ledger| ledger.id == id)
    }

    /// Case-insensitive lookup by ledger name.
    pub fn find_ledger_by_name(&self, name: &str) -> Option<&Ledger> {
        let key = name_key(name);
        self.ledgers
            .iter()
            .find(|ledger| name_key(&ledger.name) == key)
    }

    pub fn profile(&self, id: Uuid) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    pub fn profile_mut(&mut self, id: Uuid) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|profile| profile.id == id)
    }

    pub fn record(&self, id: Uuid) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn records_for(&self, ledger_id: Uuid) -> impl Iterator<Item = &TransactionRecord> {
        self.records
            .iter()
            .filter(move |record| record.ledger_id == ledger_id)
    }

    /// Deletes a record and drops the cached balance of its ledger.
    pub fn remove_record(&mut self, id: Uuid) -> Option<TransactionRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        let removed = self.records.remove(index);
        if let Some(ledger) = self.ledger_mut(removed.ledger_id) {
            ledger.invalidate_cache();
        }
        Some(removed)
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
