//! Host print adapter for the terminal: renders plain-text proofs and hands
//! them to the chosen destination.

use std::{path::Path, process::Stdio};

use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Confirm};
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info};

use checkbatch_core::{
    CheckFace, DeliveryMode, PrintAdapter, PrintError, PrintJob, PrintableState, PrinterInfo,
};
use checkbatch_domain::SheetSlot;

const RULE: &str = "------------------------------------------------------------";

#[derive(Debug, Default, Clone, Copy)]
pub struct ProofPrinter;

impl ProofPrinter {
    pub fn new() -> Self {
        Self
    }

    async fn export(&self, folder: &Path, target: &str, proof: &str) -> Result<(), PrintError> {
        tokio::fs::create_dir_all(folder)
            .await
            .map_err(|err| PrintError::new(format!("cannot create {}: {err}", folder.display())))?;
        let path = folder.join(format!("{target}.txt"));
        tokio::fs::write(&path, proof)
            .await
            .map_err(|err| PrintError::new(format!("cannot write {}: {err}", path.display())))?;
        info!(path = %path.display(), "proof exported");
        Ok(())
    }

    async fn spool(&self, printer: &str, target: &str, proof: &str) -> Result<(), PrintError> {
        let mut child = Command::new("lp")
            .args(["-d", printer, "-t", target])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| PrintError::new(format!("unable to start lp: {err}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(proof.as_bytes())
                .await
                .map_err(|err| PrintError::new(format!("unable to send job to lp: {err}")))?;
        }
        let output = child
            .wait_with_output()
            .await
            .map_err(|err| PrintError::new(format!("lp did not finish: {err}")))?;
        if output.status.success() {
            debug!(%printer, %target, "job spooled");
            Ok(())
        } else {
            let reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(PrintError::new(if reason.is_empty() {
                format!("lp exited with {}", output.status)
            } else {
                reason
            }))
        }
    }

    async fn confirm(&self, target: String, proof: String) -> Result<(), PrintError> {
        let confirmed = tokio::task::spawn_blocking(move || {
            println!("{proof}");
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Did {target} print correctly?"))
                .default(true)
                .interact()
        })
        .await
        .map_err(|err| PrintError::new(format!("print dialog failed: {err}")))?
        .map_err(|err| PrintError::new(format!("print dialog failed: {err}")))?;
        if confirmed {
            Ok(())
        } else {
            Err(PrintError::new("operator reported the print did not complete"))
        }
    }
}

#[async_trait]
impl PrintAdapter for ProofPrinter {
    async fn deliver(&self, job: &PrintJob) -> Result<(), PrintError> {
        let proof = render_proof(&job.target, &job.surface);
        match &job.mode {
            DeliveryMode::PdfExport { folder: Some(folder) } => {
                self.export(folder, &job.target, &proof).await
            }
            DeliveryMode::PdfExport { folder: None } => {
                Err(PrintError::new("no export folder configured"))
            }
            DeliveryMode::Silent {
                printer: Some(printer),
            } => self.spool(printer, &job.target, &proof).await,
            DeliveryMode::Silent { printer: None } => Err(PrintError::new("no printer configured")),
            DeliveryMode::Interactive => self.confirm(job.target.clone(), proof).await,
        }
    }

    async fn list_printers(&self) -> Result<Vec<PrinterInfo>, PrintError> {
        let output = Command::new("lpstat")
            .arg("-e")
            .output()
            .await
            .map_err(|err| PrintError::new(format!("unable to run lpstat: {err}")))?;
        if !output.status.success() {
            return Err(PrintError::new(format!("lpstat exited with {}", output.status)));
        }
        Ok(parse_printer_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// One destination per non-empty line; CUPS queue names double as display names.
pub fn parse_printer_list(raw: &str) -> Vec<PrinterInfo> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|name| PrinterInfo {
            device_name: name.to_string(),
            friendly_name: name.replace('_', " "),
        })
        .collect()
}

pub fn render_proof(target: &str, state: &PrintableState) -> String {
    let mut lines = vec![format!("== {target} ==")];
    match state {
        PrintableState::Single(face) => render_face(face, &mut lines),
        PrintableState::Sheet(slots) => {
            for (index, slot) in slots.iter().enumerate() {
                let label = SheetSlot::from_index(index)
                    .map(|slot| slot.to_string())
                    .unwrap_or_default();
                lines.push(format!("[{label}]"));
                match slot {
                    Some(face) => render_face(face, &mut lines),
                    None => lines.push("(blank)".into()),
                }
                lines.push(RULE.into());
            }
        }
    }
    lines.join("\n")
}

fn render_face(face: &CheckFace, lines: &mut Vec<String>) {
    let number = face
        .check_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "----".into());
    lines.push(format!("No. {number:<24} Date {}", face.date.format("%m/%d/%Y")));
    lines.push(format!("Pay to the order of: {:<30} ${:.2}", face.payee, face.amount));
    lines.push(format!("{} dollars", face.amount_words));
    if let Some(memo) = &face.memo {
        lines.push(format!("Memo: {memo}"));
    }
    if let Some(address) = &face.address {
        lines.push(format!("Address: {address}"));
    }
    lines.push(format!(
        "Stub: balance {:.2} -> {:.2}",
        face.snapshot.previous_balance, face.snapshot.new_balance
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkbatch_domain::BalanceSnapshot;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn face() -> CheckFace {
        CheckFace {
            ledger_id: Uuid::new_v4(),
            check_number: Some(1001),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            payee: "Acme Supply".into(),
            amount: dec!(100),
            amount_words: "One Hundred and 00/100".into(),
            memo: Some("Invoice 77".into()),
            address: None,
            snapshot: BalanceSnapshot::debit(dec!(1000), dec!(100)),
        }
    }

    #[test]
    fn proof_lists_every_slot_of_a_sheet() {
        let proof = render_proof("sheet-1", &PrintableState::Sheet([Some(face()), None, None]));
        assert!(proof.starts_with("== sheet-1 =="));
        assert!(proof.contains("[top]"));
        assert!(proof.contains("No. 1001"));
        assert!(proof.contains("$100.00"));
        assert!(proof.contains("Memo: Invoice 77"));
        assert_eq!(proof.matches("(blank)").count(), 2);
    }

    #[test]
    fn printer_list_skips_blank_lines() {
        let printers = parse_printer_list("Office_Laser\n\n  MICR_Check \n");
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[1].device_name, "MICR_Check");
        assert_eq!(printers[0].friendly_name, "Office Laser");
    }

    #[tokio::test]
    async fn pdf_mode_writes_one_proof_per_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        let job = PrintJob {
            mode: DeliveryMode::PdfExport {
                folder: Some(dir.path().join("proofs")),
            },
            target: "check-1001".into(),
            surface: PrintableState::Single(face()),
        };
        ProofPrinter::new().deliver(&job).await.expect("export");
        let written = std::fs::read_to_string(dir.path().join("proofs/check-1001.txt")).unwrap();
        assert!(written.contains("Acme Supply"));
    }
}
