use std::{fs, path::Path};

use chrono::Utc;
use uuid::Uuid;

use checkbatch_core::{dates::normalize_date, LedgerService, SystemClock};
use checkbatch_domain::{ImportQueueItem, Ledger, Profile};

use crate::{
    cli::{commands::amount_arg, context::AppContext, output, BackupCommand},
    errors::{AppError, AppResult},
};

pub fn init(
    ctx: &AppContext,
    profile: &str,
    ledger: &str,
    starting_balance: &str,
    first_check: u64,
    force: bool,
) -> AppResult<()> {
    if ctx.store.is_initialized()? && !force {
        return Err(AppError::Input(format!(
            "a book already exists at {}; pass --force to replace it",
            ctx.store.book_path().display()
        )));
    }
    if ledger.trim().is_empty() {
        return Err(AppError::Input("ledger name cannot be empty".into()));
    }
    let starting = amount_arg(starting_balance)?;
    let profile = Profile::new(profile.trim()).with_next_check_number(first_check);
    ctx.store.initialize(profile, Ledger::new(ledger.trim(), starting))?;
    output::success(format!(
        "Book created at {} with ledger `{}` (starting balance {:.2}).",
        ctx.store.book_path().display(),
        ledger.trim(),
        starting
    ));
    Ok(())
}

pub fn import(ctx: &AppContext, file: &Path, replace: bool) -> AppResult<()> {
    ctx.book()?;
    let data = fs::read_to_string(file)?;
    let rows: Vec<ImportQueueItem> = serde_json::from_str(&data)?;
    let valid = rows.iter().filter(|row| row.is_valid()).count();
    let added = rows.len();
    let queued = ctx.store.update(|book| {
        if replace {
            book.queue.clear();
        }
        book.queue.extend(rows);
        Ok(book.queue.len())
    })?;
    output::success(format!("Queued {added} rows ({valid} printable); {queued} rows waiting."));
    if valid < added {
        output::warning(format!(
            "{} rows lack a payee or a positive amount and will be skipped.",
            added - valid
        ));
    }
    Ok(())
}

pub fn show_queue(ctx: &AppContext) -> AppResult<()> {
    let book = ctx.book()?;
    if book.queue.is_empty() {
        output::info("The print queue is empty.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = book
        .queue
        .iter()
        .enumerate()
        .map(|(index, item)| {
            vec![
                (index + 1).to_string(),
                item.payee.clone(),
                item.amount.clone(),
                item.date.clone(),
                item.ledger().unwrap_or("-").to_string(),
                if item.is_valid() { "" } else { "skip" }.to_string(),
            ]
        })
        .collect();
    output::table(&["#", "Payee", "Amount", "Date", "Ledger", ""], &rows);
    Ok(())
}

pub fn history(ctx: &AppContext, ledger: Option<&str>) -> AppResult<()> {
    let book = ctx.book()?;
    let filter = match ledger {
        Some(name) => Some(ctx.ledger_id(&book, Some(name))?),
        None => None,
    };
    let records = LedgerService::history(&book, filter);
    if records.is_empty() {
        output::info("No transactions recorded.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let ledger = book
                .ledger(record.ledger_id)
                .map(|ledger| ledger.name.clone())
                .unwrap_or_else(|| "?".into());
            vec![
                record.date.to_string(),
                record.kind.to_string(),
                record
                    .check_number
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                record.payee.clone(),
                format!("{:.2}", record.signed_amount()),
                format!("{:.2}", record.snapshot.new_balance),
                ledger,
                record.id.to_string(),
            ]
        })
        .collect();
    output::table(
        &["Date", "Kind", "No.", "Payee", "Amount", "Balance", "Ledger", "Id"],
        &rows,
    );
    Ok(())
}

pub fn deposit(
    ctx: &AppContext,
    amount: &str,
    ledger: Option<&str>,
    payee: &str,
    date: Option<&str>,
) -> AppResult<()> {
    let book = ctx.book()?;
    let ledger_id = ctx.ledger_id(&book, ledger)?;
    let amount = amount_arg(amount)?;
    let date = normalize_date(date.unwrap_or_default(), Utc::now().date_naive());
    ctx.store.update(|book| {
        LedgerService::record_deposit(book, ledger_id, date, payee, amount, &SystemClock)
    })?;
    output::success(format!("Deposited {amount:.2}."));
    Ok(())
}

pub fn note(ctx: &AppContext, text: &str, ledger: Option<&str>) -> AppResult<()> {
    let book = ctx.book()?;
    let ledger_id = ctx.ledger_id(&book, ledger)?;
    let today = Utc::now().date_naive();
    ctx.store
        .update(|book| LedgerService::record_note(book, ledger_id, today, text, &SystemClock))?;
    output::success("Note recorded.");
    Ok(())
}

pub fn delete_record(ctx: &AppContext, id: Uuid) -> AppResult<()> {
    ctx.book()?;
    let removed = ctx
        .store
        .update(|book| LedgerService::delete_record(book, id))?;
    output::success(format!(
        "Deleted {} `{}` ({:.2}).",
        removed.kind, removed.payee, removed.amount
    ));
    Ok(())
}

pub fn backup(ctx: &AppContext, action: BackupCommand) -> AppResult<()> {
    ctx.book()?;
    match action {
        BackupCommand::Create { note } => {
            let info = ctx.store.backup(note.as_deref())?;
            output::success(format!("Backup written: {}", info.name));
        }
        BackupCommand::List => {
            let backups = ctx.store.list_backups()?;
            if backups.is_empty() {
                output::info("No backups yet.");
            }
            for info in backups {
                output::info(format!("{} ({} bytes)", info.name, info.size_bytes));
            }
        }
        BackupCommand::Restore { name } => {
            ctx.store.restore(&name)?;
            output::success(format!("Restored {name}."));
        }
    }
    Ok(())
}
