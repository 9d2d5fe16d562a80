//! File plumbing shared by the config and book stores.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::warn;

const TMP_SUFFIX: &str = "tmp";
const BACKUP_EXTENSION: &str = "json";

/// Replaces `path` with `data` through a sibling temp file and a rename.
pub fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    path.with_extension(ext)
}

/// A folder of `<prefix><timestamp>[_<note>].json` snapshots.
///
/// The timestamp format must be fixed-width so that name order is time order.
#[derive(Debug, Clone)]
pub struct BackupFolder {
    dir: PathBuf,
    prefix: &'static str,
    stamp_format: &'static str,
}

impl BackupFolder {
    pub fn new(dir: PathBuf, prefix: &'static str, stamp_format: &'static str) -> Self {
        Self {
            dir,
            prefix,
            stamp_format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Where a backup taken now with `note` goes.
    pub fn next_path(&self, note: Option<&str>) -> PathBuf {
        let mut name = format!("{}{}", self.prefix, Utc::now().format(self.stamp_format));
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        self.dir.join(format!("{name}.{BACKUP_EXTENSION}"))
    }

    /// Backup files, newest first.
    pub fn list(&self) -> io::Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let owned = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| self.owns(name));
            if owned && path.is_file() {
                entries.push(path);
            }
        }
        entries.sort_by_key(|path| Reverse(path.file_name().map(|name| name.to_os_string())));
        Ok(entries)
    }

    /// Path of the existing backup called `name`. Anything other than a bare
    /// backup file name from this folder is refused.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        if name.contains(|ch: char| matches!(ch, '/' | '\\')) || !self.owns(name) {
            return None;
        }
        let path = self.dir.join(name);
        path.is_file().then_some(path)
    }

    /// Removes all but the newest `keep` backups.
    pub fn prune(&self, keep: usize) -> io::Result<()> {
        for path in self.list()?.into_iter().skip(keep) {
            if let Err(err) = fs::remove_file(&path) {
                warn!(backup = %path.display(), error = %err, "unable to prune backup");
            }
        }
        Ok(())
    }

    fn owns(&self, name: &str) -> bool {
        name.starts_with(self.prefix)
            && name
                .strip_suffix(BACKUP_EXTENSION)
                .is_some_and(|stem| stem.ends_with('.'))
            && !name.contains("..")
    }
}

/// Lowercase ASCII words joined by dashes, or `None` when nothing survives.
pub fn sanitize_note(note: Option<&str>) -> Option<String> {
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in note?.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
