use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "CHECKBATCH_HOME";
const DEFAULT_DIR: &str = ".checkbatch";

/// Application home: `$CHECKBATCH_HOME`, then `~/.checkbatch`.
pub fn app_home() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR),
    }
}
