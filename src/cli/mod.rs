//! Command-line front end.

pub mod commands;
pub mod context;
pub mod output;
pub mod printer;
pub mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use checkbatch_core::BatchMode;

use crate::{cli::context::AppContext, errors::AppResult};

#[derive(Parser, Debug)]
#[command(
    name = "checkbatch_cli",
    version,
    about = "Batch check printing with derived ledger balances"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the book with a profile and a first ledger
    Init {
        #[arg(long, default_value = "Main")]
        profile: String,
        #[arg(long, default_value = "Operating")]
        ledger: String,
        #[arg(long, default_value = "0")]
        starting_balance: String,
        /// Next check number of the new profile
        #[arg(long, default_value_t = checkbatch_domain::DEFAULT_FIRST_CHECK_NUMBER)]
        first_check: u64,
        /// Overwrite an existing book
        #[arg(long)]
        force: bool,
    },
    /// Append rows from a JSON array to the print queue
    Import {
        file: PathBuf,
        /// Drop the current queue first
        #[arg(long)]
        replace: bool,
    },
    /// Show the pending print queue
    Queue,
    /// Print the queued checks and record them
    Run {
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// First check number for this run
        #[arg(long)]
        start: Option<u64>,
        /// Use the check numbers carried by the queue rows
        #[arg(long)]
        no_auto_number: bool,
    },
    /// List ledgers with derived balances
    Ledgers,
    /// Maintain a single ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerCommand,
    },
    /// Show recorded transactions
    History {
        #[arg(long)]
        ledger: Option<String>,
    },
    /// Record a deposit
    Deposit {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        ledger: Option<String>,
        #[arg(long, default_value = "Deposit")]
        payee: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Record a note that does not move the balance
    Note {
        text: String,
        #[arg(long)]
        ledger: Option<String>,
    },
    /// Delete a recorded transaction
    DeleteRecord { id: Uuid },
    /// Inspect or change preferences
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Book backups
    Backup {
        #[command(subcommand)]
        action: BackupCommand,
    },
    /// List printers known to the host
    Printers,
    /// Show build metadata
    Info,
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    Create {
        name: String,
        #[arg(long, default_value = "0")]
        starting_balance: String,
    },
    SetStart {
        name: String,
        amount: String,
    },
    Lock {
        name: String,
    },
    Unlock {
        name: String,
    },
    /// Make a ledger the default for rows without a ledger name
    Use {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    Backup {
        #[arg(long)]
        note: Option<String>,
    },
    Backups,
    Restore {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    Create {
        #[arg(long)]
        note: Option<String>,
    },
    List,
    Restore {
        name: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Standard,
    ThreeUp,
}

impl From<ModeArg> for BatchMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Standard => BatchMode::Standard,
            ModeArg::ThreeUp => BatchMode::ThreeUp,
        }
    }
}

pub async fn run_cli() -> AppResult<()> {
    let cli = Cli::parse();
    dispatch(cli.command).await
}

pub async fn dispatch(command: Commands) -> AppResult<()> {
    if let Commands::Info = command {
        commands::system::info();
        return Ok(());
    }
    let mut ctx = AppContext::load()?;
    match command {
        Commands::Init {
            profile,
            ledger,
            starting_balance,
            first_check,
            force,
        } => commands::book::init(&ctx, &profile, &ledger, &starting_balance, first_check, force),
        Commands::Import { file, replace } => commands::book::import(&ctx, &file, replace),
        Commands::Queue => commands::book::show_queue(&ctx),
        Commands::Run {
            mode,
            start,
            no_auto_number,
        } => commands::batch::run(&ctx, mode.map(Into::into), start, no_auto_number).await,
        Commands::Ledgers => commands::ledger::list(&ctx),
        Commands::Ledger { action } => commands::ledger::handle(&ctx, action),
        Commands::History { ledger } => commands::book::history(&ctx, ledger.as_deref()),
        Commands::Deposit {
            amount,
            ledger,
            payee,
            date,
        } => commands::book::deposit(&ctx, &amount, ledger.as_deref(), &payee, date.as_deref()),
        Commands::Note { text, ledger } => commands::book::note(&ctx, &text, ledger.as_deref()),
        Commands::DeleteRecord { id } => commands::book::delete_record(&ctx, id),
        Commands::Config { action } => commands::config::handle(&mut ctx, action),
        Commands::Backup { action } => commands::book::backup(&ctx, action),
        Commands::Printers => commands::system::printers().await,
        Commands::Info => Ok(()),
    }
}
