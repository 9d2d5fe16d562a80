//! checkbatch-storage-json
//!
//! File-backed [`LedgerRepository`]: the whole book lives in one pretty
//! JSON document with rolling backups beside it.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use checkbatch_config::{write_atomic, BackupFolder};
use checkbatch_core::{
    apply_commit, BalanceOracle, BatchCommit, CoreError, CoreResult, LedgerRepository,
};
use checkbatch_domain::{Book, Ledger, Profile, CURRENT_SCHEMA_VERSION};

const BOOK_FILE: &str = "book.json";
const BACKUPS_DIR: &str = "backups";
const BACKUP_PREFIX: &str = "book_";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
pub const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Book persisted at `<root>/book.json`.
///
/// The file is read once at open; reads are served from the in-memory copy
/// and every write goes to disk before the copy is replaced.
#[derive(Debug)]
pub struct JsonBookStore {
    book_path: PathBuf,
    backups: BackupFolder,
    retention: usize,
    book: Mutex<Book>,
}

impl JsonBookStore {
    pub fn open(root: PathBuf) -> CoreResult<Self> {
        Self::with_retention(root, DEFAULT_RETENTION)
    }

    pub fn with_retention(root: PathBuf, retention: usize) -> CoreResult<Self> {
        let backups = BackupFolder::new(
            root.join(BACKUPS_DIR),
            BACKUP_PREFIX,
            BACKUP_TIMESTAMP_FORMAT,
        );
        backups.ensure()?;
        let book_path = root.join(BOOK_FILE);
        let book = if book_path.exists() {
            load_book_from_path(&book_path)?
        } else {
            debug!(path = %book_path.display(), "no book on disk yet");
            Book::default()
        };
        Ok(Self {
            book_path,
            backups,
            retention: retention.max(1),
            book: Mutex::new(book),
        })
    }

    pub fn book_path(&self) -> &Path {
        &self.book_path
    }

    pub fn backups_dir(&self) -> &Path {
        self.backups.dir()
    }

    pub fn is_initialized(&self) -> CoreResult<bool> {
        Ok(self.book_path.exists() && !self.lock()?.profiles.is_empty())
    }

    /// Writes a fresh book with one profile and one ledger.
    pub fn initialize(&self, profile: Profile, ledger: Ledger) -> CoreResult<Book> {
        let book = Book::with_defaults(profile, ledger);
        self.replace(book.clone())?;
        info!(path = %self.book_path.display(), "book initialized");
        Ok(book)
    }

    /// Clone of the current book.
    pub fn snapshot(&self) -> CoreResult<Book> {
        Ok(self.lock()?.clone())
    }

    /// Runs `mutator` on a copy of the book and persists the copy when it succeeds.
    pub fn update<T, F>(&self, mutator: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Book) -> CoreResult<T>,
    {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        let result = mutator(&mut staged)?;
        self.persist(&staged)?;
        *guard = staged;
        Ok(result)
    }

    pub fn replace(&self, book: Book) -> CoreResult<()> {
        let mut guard = self.lock()?;
        self.persist(&book)?;
        *guard = book;
        Ok(())
    }

    /// Snapshots the current book into the backups folder with an optional note.
    pub fn backup(&self, note: Option<&str>) -> CoreResult<BackupInfo> {
        let book = self.snapshot()?;
        let path = self.backups.next_path(note);
        write_atomic(&path, &serialize_book(&book)?)?;
        self.backups.prune(self.retention)?;
        info!(backup = %path.display(), "book backup created");
        self.describe(&path)
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> CoreResult<Vec<BackupInfo>> {
        self.backups
            .list()?
            .iter()
            .map(|path| self.describe(path))
            .collect()
    }

    /// Makes a backup the current book. The replaced book is backed up first.
    ///
    /// `name` must be the bare file name of a backup in the backups folder.
    pub fn restore(&self, name: &str) -> CoreResult<Book> {
        let path = self
            .backups
            .locate(name)
            .ok_or_else(|| CoreError::Storage(format!("backup `{name}` not found")))?;
        let restored = load_book_from_path(&path)?;
        self.replace(restored.clone())?;
        info!(backup = %name, "book restored");
        Ok(restored)
    }

    fn persist(&self, book: &Book) -> CoreResult<()> {
        if self.book_path.exists() {
            fs::copy(&self.book_path, self.backups.next_path(None))?;
            self.backups.prune(self.retention)?;
        }
        write_atomic(&self.book_path, &serialize_book(book)?)?;
        debug!(path = %self.book_path.display(), records = book.records.len(), "book saved");
        Ok(())
    }

    fn describe(&self, path: &Path) -> CoreResult<BackupInfo> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(BackupInfo {
            name,
            path: path.to_path_buf(),
            size_bytes: fs::metadata(path)?.len(),
        })
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, Book>> {
        self.book
            .lock()
            .map_err(|_| CoreError::Storage("book lock poisoned".into()))
    }
}

impl LedgerRepository for JsonBookStore {
    fn find_ledger_by_name(&self, name: &str) -> CoreResult<Option<Ledger>> {
        Ok(self.lock()?.find_ledger_by_name(name).cloned())
    }

    fn current_balance(&self, ledger_id: Uuid) -> CoreResult<Decimal> {
        let book = self.lock()?;
        Ok(BalanceOracle::balance(&book, ledger_id))
    }

    fn profile(&self, id: Uuid) -> CoreResult<Option<Profile>> {
        Ok(self.lock()?.profile(id).cloned())
    }

    fn commit_batch(&self, commit: BatchCommit) -> CoreResult<()> {
        let records = commit.records.len();
        self.update(|book| apply_commit(book, commit))?;
        info!(records, path = %self.book_path.display(), "batch persisted");
        Ok(())
    }
}

/// Loads a book, refusing documents written by a newer schema.
pub fn load_book_from_path(path: &Path) -> CoreResult<Book> {
    let data = fs::read_to_string(path)?;
    let book: Book =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::Storage(format!(
            "book schema version {} is newer than supported version {}",
            book.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(book)
}

fn serialize_book(book: &Book) -> CoreResult<String> {
    serde_json::to_string_pretty(book).map_err(|err| CoreError::Serde(err.to_string()))
}
