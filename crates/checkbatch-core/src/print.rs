//! Boundary to the host's printing and rendering facilities.

use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use checkbatch_domain::{BalanceSnapshot, SheetSlot};

use crate::{CoreError, CoreResult};

/// How a rendered surface leaves the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// The host shows its print dialog and the operator confirms.
    Interactive,
    /// Straight to a saved printer without a dialog.
    Silent { printer: Option<String> },
    /// One PDF per print call, written into a folder.
    PdfExport { folder: Option<PathBuf> },
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Interactive => f.write_str("interactive"),
            DeliveryMode::Silent { printer } => match printer {
                Some(name) => write!(f, "silent ({name})"),
                None => f.write_str("silent"),
            },
            DeliveryMode::PdfExport { folder } => match folder {
                Some(path) => write!(f, "pdf ({})", path.display()),
                None => f.write_str("pdf"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterInfo {
    pub device_name: String,
    pub friendly_name: String,
}

/// Everything printed on a single check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckFace {
    pub ledger_id: Uuid,
    pub check_number: Option<u64>,
    pub date: NaiveDate,
    pub payee: String,
    pub amount: Decimal,
    pub amount_words: String,
    pub memo: Option<String>,
    pub address: Option<String>,
    pub snapshot: BalanceSnapshot,
}

/// The state the rendering subsystem draws on the next print call.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintableState {
    Single(CheckFace),
    /// Top, middle and bottom positions of a three-up sheet.
    Sheet([Option<CheckFace>; 3]),
}

impl PrintableState {
    pub fn faces(&self) -> Vec<(Option<SheetSlot>, &CheckFace)> {
        match self {
            PrintableState::Single(face) => vec![(None, face)],
            PrintableState::Sheet(slots) => slots
                .iter()
                .enumerate()
                .filter_map(|(index, face)| {
                    face.as_ref().map(|face| (SheetSlot::from_index(index), face))
                })
                .collect(),
        }
    }
}

/// Settable "current printable state".
///
/// Whatever was last staged is exactly what the next print call renders.
pub trait PrintSurface: Send + Sync {
    fn stage(&self, state: PrintableState);
    fn current(&self) -> Option<PrintableState>;
    /// Clears the staged state and any operator input buffer.
    fn reset(&self);
}

/// In-process surface that can be shared between the engine and an adapter.
#[derive(Debug, Default, Clone)]
pub struct SharedSurface {
    state: Arc<Mutex<Option<PrintableState>>>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrintSurface for SharedSurface {
    fn stage(&self, state: PrintableState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = Some(state);
        }
    }

    fn current(&self) -> Option<PrintableState> {
        self.state.lock().ok().and_then(|guard| guard.clone())
    }

    fn reset(&self) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = None;
        }
    }
}

/// One delivery request: a mode, a document title, and the rendered state.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub mode: DeliveryMode,
    pub target: String,
    pub surface: PrintableState,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PrintError {
    pub message: String,
}

impl PrintError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Host print facility. A returned error covers both a reported failure and
/// anything the host raised while printing.
#[async_trait]
pub trait PrintAdapter: Send + Sync {
    async fn deliver(&self, job: &PrintJob) -> Result<(), PrintError>;
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>, PrintError>;
}

/// Rejects delivery settings that cannot work before any check is staged.
pub async fn validate_delivery(mode: &DeliveryMode, adapter: &dyn PrintAdapter) -> CoreResult<()> {
    match mode {
        DeliveryMode::Interactive => Ok(()),
        DeliveryMode::Silent { printer } => {
            let Some(name) = printer.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
                return Err(CoreError::Configuration(
                    "silent printing requires a saved printer".into(),
                ));
            };
            let printers = adapter.list_printers().await.map_err(|err| {
                CoreError::Configuration(format!("unable to list printers: {err}"))
            })?;
            let known = printers
                .iter()
                .any(|info| info.device_name == name || info.friendly_name == name);
            if known {
                Ok(())
            } else {
                Err(CoreError::Configuration(format!(
                    "printer `{name}` is not available"
                )))
            }
        }
        DeliveryMode::PdfExport { folder } => match folder {
            Some(path) if !path.as_os_str().is_empty() => Ok(()),
            _ => Err(CoreError::Configuration(
                "PDF export requires an export folder".into(),
            )),
        },
    }
}
