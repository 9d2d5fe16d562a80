//! Maps free-text ledger names to ledger ids during a batch run.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use checkbatch_domain::{name_key, non_blank, Ledger};

use crate::{repository::LedgerRepository, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub ledger_id: Uuid,
    /// True the first time a name is provisioned in this session.
    pub provisioned: bool,
}

/// Session-scoped registry of ledger names.
///
/// Lookups check names already seen this session, then the repository.
/// Unknown names get a fresh ledger that only lives here until commit.
#[derive(Debug, Default)]
pub struct LedgerRouter {
    index: HashMap<String, Uuid>,
    provisioned: Vec<Ledger>,
}

impl LedgerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &mut self,
        repository: &dyn LedgerRepository,
        name: Option<&str>,
        default_ledger: Uuid,
    ) -> CoreResult<Resolution> {
        let Some(name) = non_blank(name) else {
            return Ok(Resolution {
                ledger_id: default_ledger,
                provisioned: false,
            });
        };

        let key = name_key(name);
        if let Some(id) = self.index.get(&key) {
            return Ok(Resolution {
                ledger_id: *id,
                provisioned: false,
            });
        }

        if let Some(existing) = repository.find_ledger_by_name(name)? {
            self.index.insert(key, existing.id);
            return Ok(Resolution {
                ledger_id: existing.id,
                provisioned: false,
            });
        }

        let ledger = Ledger::provisioned(name);
        let id = ledger.id;
        info!(ledger = %ledger.name, %id, "provisioning ledger for batch");
        self.index.insert(key, id);
        self.provisioned.push(ledger);
        Ok(Resolution {
            ledger_id: id,
            provisioned: true,
        })
    }

    pub fn provisioned(&self) -> &[Ledger] {
        &self.provisioned
    }

    pub fn is_provisioned(&self, ledger_id: Uuid) -> bool {
        self.provisioned.iter().any(|ledger| ledger.id == ledger_id)
    }

    pub fn into_provisioned(self) -> Vec<Ledger> {
        self.provisioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use checkbatch_domain::{Book, Profile};
    use rust_decimal_macros::dec;

    fn repository() -> (MemoryRepository, Uuid, Uuid) {
        let active = Ledger::new("Operating", dec!(0));
        let payroll = Ledger::new("Payroll", dec!(0));
        let active_id = active.id;
        let payroll_id = payroll.id;
        let mut book = Book::with_defaults(Profile::new("Main"), active);
        book.ledgers.push(payroll);
        (MemoryRepository::new(book), active_id, payroll_id)
    }

    #[test]
    fn blank_names_fall_back_to_default() {
        let (repo, active, _) = repository();
        let mut router = LedgerRouter::new();
        for name in [None, Some(""), Some("   ")] {
            let resolution = router.resolve(&repo, name, active).unwrap();
            assert_eq!(resolution.ledger_id, active);
            assert!(!resolution.provisioned);
        }
        assert!(router.provisioned().is_empty());
    }

    #[test]
    fn known_ledgers_match_case_insensitively() {
        let (repo, active, payroll) = repository();
        let mut router = LedgerRouter::new();
        let resolution = router.resolve(&repo, Some("PAYROLL"), active).unwrap();
        assert_eq!(resolution.ledger_id, payroll);
        assert!(!resolution.provisioned);
    }

    #[test]
    fn new_names_are_provisioned_once() {
        let (repo, active, _) = repository();
        let mut router = LedgerRouter::new();
        let first = router.resolve(&repo, Some("Ops"), active).unwrap();
        let second = router.resolve(&repo, Some(" ops "), active).unwrap();
        let third = router.resolve(&repo, Some("OPS"), active).unwrap();

        assert!(first.provisioned);
        assert!(!second.provisioned);
        assert_eq!(first.ledger_id, second.ledger_id);
        assert_eq!(first.ledger_id, third.ledger_id);
        assert_eq!(router.provisioned().len(), 1);
        assert_eq!(router.provisioned()[0].name, "Ops");
        assert!(router.is_provisioned(first.ledger_id));
    }
}
