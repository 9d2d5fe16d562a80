use std::sync::Arc;

use tracing::info;

use checkbatch_config::Layout;
use checkbatch_core::{BatchEngine, BatchMode, BatchOptions, BatchSummary, SharedSurface, SystemClock};

use crate::{
    cli::{context::AppContext, output, printer::ProofPrinter, prompt::TerminalPrompt},
    errors::AppResult,
};

pub async fn run(
    ctx: &AppContext,
    mode: Option<BatchMode>,
    start: Option<u64>,
    no_auto_number: bool,
) -> AppResult<()> {
    let book = ctx.book()?;
    if book.queue.is_empty() {
        output::info("The print queue is empty; import rows first.");
        return Ok(());
    }

    let mode = mode.unwrap_or(match ctx.config.layout {
        Layout::Standard => BatchMode::Standard,
        Layout::ThreeUp => BatchMode::ThreeUp,
    });
    let auto_number = ctx.config.auto_number && !no_auto_number;
    let options = BatchOptions::new(
        ctx.active_profile(&book)?,
        ctx.active_ledger(&book)?,
        ctx.delivery_mode(),
    )
    .with_mode(mode)
    .with_auto_number(auto_number, start)
    .with_delays(ctx.config.settle_delay(), ctx.config.spool_delay());

    let engine = BatchEngine::new(
        ctx.store.clone(),
        Arc::new(ProofPrinter::new()),
        Arc::new(SharedSurface::new()),
        Arc::new(SystemClock),
    );
    let mut run = engine.prepare(options.clone(), book.queue).await?;

    let cancel = run.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current check");
            cancel.cancel();
        }
    });

    output::section(format!("Printing {} rows ({})", run.progress().total, options.delivery));
    let result = run.drive(&TerminalPrompt).await;
    interrupt.abort();
    report(&result?);
    Ok(())
}

fn report(summary: &BatchSummary) {
    let line = format!(
        "{} of {} printed, {} failed, {} skipped; next check number {}.",
        summary.processed, summary.total, summary.failed, summary.skipped, summary.next_check_number
    );
    if summary.cancelled {
        output::warning(format!("Batch stopped early. {line}"));
    } else {
        output::success(format!("Batch complete. {line}"));
    }
}
