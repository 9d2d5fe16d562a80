use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Select};
use tracing::warn;

use checkbatch_core::{OperatorDecision, OperatorPrompt, PrintFailure};

use crate::cli::output;

/// Asks the operator on the terminal whether to abort or skip after a failed print.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

#[async_trait]
impl OperatorPrompt for TerminalPrompt {
    async fn decide(&self, failure: &PrintFailure) -> OperatorDecision {
        output::error(format!("{} failed: {}", failure.target, failure.error));
        for line in describe(failure) {
            output::info(line);
        }

        let answer = tokio::task::spawn_blocking(|| {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("How should the batch continue?")
                .items(&["Abort the batch", "Skip and continue"])
                .default(0)
                .interact_opt()
        })
        .await;

        match answer {
            Ok(Ok(Some(1))) => OperatorDecision::Skip,
            Ok(Ok(_)) => OperatorDecision::Abort,
            Ok(Err(err)) => {
                warn!(error = %err, "prompt failed, aborting batch");
                OperatorDecision::Abort
            }
            Err(err) => {
                warn!(error = %err, "prompt task failed, aborting batch");
                OperatorDecision::Abort
            }
        }
    }
}

/// One line per check caught in the failed call.
pub fn describe(failure: &PrintFailure) -> Vec<String> {
    failure
        .items
        .iter()
        .map(|item| {
            let number = item
                .check_number
                .map(|n| format!("#{n}"))
                .unwrap_or_else(|| "unnumbered".into());
            let slot = item
                .slot
                .map(|slot| format!(" [{slot}]"))
                .unwrap_or_default();
            format!(
                "row {}{slot}: {} {} ${:.2}",
                item.queue_index + 1,
                number,
                item.payee,
                item.amount
            )
        })
        .collect()
}
