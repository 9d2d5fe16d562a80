#![allow(dead_code)]

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use checkbatch_core::{
    BatchEngine, BatchMode, BatchOptions, DeliveryMode, FixedClock, MemoryRepository,
    OperatorDecision, OperatorPrompt, PrintAdapter, PrintError, PrintFailure, PrintJob,
    PrinterInfo, SharedSurface,
};
use checkbatch_domain::{Book, Ledger, Profile};

/// Adapter that fails the print calls whose 1-based positions are listed.
#[derive(Default)]
pub struct ScriptedPrinter {
    failing_calls: HashSet<usize>,
    jobs: Mutex<Vec<PrintJob>>,
}

impl ScriptedPrinter {
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            failing_calls: calls.iter().copied().collect(),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs(&self) -> Vec<PrintJob> {
        self.jobs.lock().expect("jobs lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.jobs.lock().expect("jobs lock").len()
    }
}

#[async_trait]
impl PrintAdapter for ScriptedPrinter {
    async fn deliver(&self, job: &PrintJob) -> Result<(), PrintError> {
        let call = {
            let mut jobs = self.jobs.lock().expect("jobs lock");
            jobs.push(job.clone());
            jobs.len()
        };
        if self.failing_calls.contains(&call) {
            Err(PrintError::new("printer jammed"))
        } else {
            Ok(())
        }
    }

    async fn list_printers(&self) -> Result<Vec<PrinterInfo>, PrintError> {
        Ok(vec![PrinterInfo {
            device_name: "MICR_1".into(),
            friendly_name: "Check Printer".into(),
        }])
    }
}

/// Replays a fixed list of operator answers and remembers what it was asked.
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<OperatorDecision>>,
    seen: Mutex<Vec<PrintFailure>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[OperatorDecision]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<PrintFailure> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedPrompt {
    async fn decide(&self, failure: &PrintFailure) -> OperatorDecision {
        self.seen.lock().expect("seen lock").push(failure.clone());
        self.answers
            .lock()
            .expect("answers lock")
            .pop_front()
            .unwrap_or(OperatorDecision::Abort)
    }
}

pub struct Harness {
    pub repository: Arc<MemoryRepository>,
    pub printer: Arc<ScriptedPrinter>,
    pub surface: Arc<SharedSurface>,
    pub engine: BatchEngine,
    pub profile_id: Uuid,
    pub default_ledger: Uuid,
}

impl Harness {
    pub fn new(starting_balance: Decimal, next_check_number: u64, printer: ScriptedPrinter) -> Self {
        let profile = Profile::new("Main").with_next_check_number(next_check_number);
        let ledger = Ledger::new("Operating", starting_balance);
        let profile_id = profile.id;
        let default_ledger = ledger.id;
        let repository = Arc::new(MemoryRepository::new(Book::with_defaults(profile, ledger)));
        let printer = Arc::new(printer);
        let surface = Arc::new(SharedSurface::new());
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap());
        let engine = BatchEngine::new(
            repository.clone(),
            printer.clone(),
            surface.clone(),
            Arc::new(clock),
        );
        Self {
            repository,
            printer,
            surface,
            engine,
            profile_id,
            default_ledger,
        }
    }

    pub fn options(&self, mode: BatchMode) -> BatchOptions {
        BatchOptions::new(self.profile_id, self.default_ledger, DeliveryMode::Interactive)
            .with_mode(mode)
            .with_delays(Duration::ZERO, Duration::ZERO)
    }

    pub fn book(&self) -> Book {
        self.repository.snapshot().expect("snapshot")
    }

    pub fn ledger_named(&self, name: &str) -> Ledger {
        self.book()
            .find_ledger_by_name(name)
            .cloned()
            .expect("ledger exists")
    }
}
