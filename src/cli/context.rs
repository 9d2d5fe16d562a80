use std::{path::PathBuf, sync::Arc};

use uuid::Uuid;

use checkbatch_config::{Config, ConfigManager, DeliveryPreference};
use checkbatch_core::DeliveryMode;
use checkbatch_domain::Book;
use checkbatch_storage_json::JsonBookStore;

use crate::{
    errors::{AppError, AppResult},
    utils::paths,
};

/// Everything a command needs: resolved home, saved preferences and the book.
pub struct AppContext {
    pub home: PathBuf,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub store: Arc<JsonBookStore>,
}

impl AppContext {
    pub fn load() -> AppResult<Self> {
        Self::load_from(paths::app_home())
    }

    pub fn load_from(home: PathBuf) -> AppResult<Self> {
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;
        let store = JsonBookStore::open(config.resolve_data_root(&home))?;
        Ok(Self {
            home,
            config_manager,
            config,
            store: Arc::new(store),
        })
    }

    /// Current book, failing when `init` has not been run.
    pub fn book(&self) -> AppResult<Book> {
        if !self.store.is_initialized()? {
            return Err(AppError::NotInitialized(
                self.store.book_path().display().to_string(),
            ));
        }
        Ok(self.store.snapshot()?)
    }

    pub fn active_profile(&self, book: &Book) -> AppResult<Uuid> {
        book.active_profile_id
            .ok_or_else(|| AppError::Input("the book has no active profile".into()))
    }

    pub fn active_ledger(&self, book: &Book) -> AppResult<Uuid> {
        book.active_ledger_id
            .ok_or_else(|| AppError::Input("the book has no active ledger".into()))
    }

    /// Ledger id by name, or the active ledger when no name is given.
    pub fn ledger_id(&self, book: &Book, name: Option<&str>) -> AppResult<Uuid> {
        match name {
            Some(name) => book
                .find_ledger_by_name(name)
                .map(|ledger| ledger.id)
                .ok_or_else(|| AppError::Input(format!("no ledger named `{name}`"))),
            None => self.active_ledger(book),
        }
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        match self.config.delivery_mode {
            DeliveryPreference::Interactive => DeliveryMode::Interactive,
            DeliveryPreference::Silent => DeliveryMode::Silent {
                printer: self.config.printer_name.clone(),
            },
            DeliveryPreference::Pdf => DeliveryMode::PdfExport {
                folder: self.config.export_folder.clone(),
            },
        }
    }
}
