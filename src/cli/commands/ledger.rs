use checkbatch_core::LedgerService;

use crate::{
    cli::{commands::amount_arg, context::AppContext, output, LedgerCommand},
    errors::AppResult,
};

pub fn list(ctx: &AppContext) -> AppResult<()> {
    let book = ctx.book()?;
    let rows: Vec<Vec<String>> = LedgerService::balances(&book)
        .into_iter()
        .map(|line| {
            let ledger = book.ledger(line.ledger_id);
            let active = book.active_ledger_id == Some(line.ledger_id);
            let locked = ledger.map(|l| l.lock_start).unwrap_or(false);
            vec![
                if active { "*" } else { "" }.to_string(),
                line.name,
                format!("{:.2}", line.starting_balance),
                format!("{:.2}", line.balance),
                line.record_count.to_string(),
                if locked { "locked" } else { "" }.to_string(),
            ]
        })
        .collect();
    output::table(&["", "Ledger", "Start", "Balance", "Records", ""], &rows);
    Ok(())
}

pub fn handle(ctx: &AppContext, action: LedgerCommand) -> AppResult<()> {
    let book = ctx.book()?;
    match action {
        LedgerCommand::Create {
            name,
            starting_balance,
        } => {
            let starting = amount_arg(&starting_balance)?;
            ctx.store
                .update(|book| LedgerService::create(book, &name, starting))?;
            output::success(format!("Ledger `{}` created.", name.trim()));
        }
        LedgerCommand::SetStart { name, amount } => {
            let id = ctx.ledger_id(&book, Some(&name))?;
            let amount = amount_arg(&amount)?;
            ctx.store
                .update(|book| LedgerService::set_starting_balance(book, id, amount))?;
            output::success(format!("Starting balance of `{name}` set to {amount:.2}."));
        }
        LedgerCommand::Lock { name } => {
            let id = ctx.ledger_id(&book, Some(&name))?;
            ctx.store
                .update(|book| LedgerService::set_lock(book, id, true))?;
            output::success(format!("Starting balance of `{name}` locked."));
        }
        LedgerCommand::Unlock { name } => {
            let id = ctx.ledger_id(&book, Some(&name))?;
            ctx.store
                .update(|book| LedgerService::set_lock(book, id, false))?;
            output::success(format!("Starting balance of `{name}` unlocked."));
        }
        LedgerCommand::Use { name } => {
            let id = ctx.ledger_id(&book, Some(&name))?;
            ctx.store.update(|book| {
                book.active_ledger_id = Some(id);
                Ok(())
            })?;
            output::success(format!("`{name}` is now the default ledger."));
        }
    }
    Ok(())
}
