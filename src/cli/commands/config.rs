use checkbatch_config::Config;

use crate::{
    cli::{context::AppContext, output, ConfigCommand},
    errors::AppResult,
};

pub fn handle(ctx: &mut AppContext, action: ConfigCommand) -> AppResult<()> {
    match action {
        ConfigCommand::Show => show(&ctx.config),
        ConfigCommand::Set { key, value } => {
            ctx.config.set_value(&key, &value)?;
            ctx.config_manager.save(&ctx.config)?;
            output::success(format!("{key} updated."));
        }
        ConfigCommand::Backup { note } => {
            let name = ctx.config_manager.backup(&ctx.config, note.as_deref())?;
            output::success(format!("Configuration backup written: {name}"));
        }
        ConfigCommand::Backups => {
            let backups = ctx.config_manager.list_backups()?;
            if backups.is_empty() {
                output::info("No configuration backups yet.");
            }
            for name in backups {
                output::info(name);
            }
        }
        ConfigCommand::Restore { name } => {
            ctx.config = ctx.config_manager.restore(&name)?;
            output::success(format!("Configuration restored from {name}."));
        }
    }
    Ok(())
}

fn show(config: &Config) {
    let rows: Vec<Vec<String>> = config
        .entries()
        .into_iter()
        .map(|(key, value)| vec![key.to_string(), value])
        .collect();
    output::table(&["Key", "Value"], &rows);
}
