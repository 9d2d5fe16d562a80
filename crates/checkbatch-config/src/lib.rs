//! checkbatch-config
//!
//! Operator preferences for printing and numbering.
//! Owns the Config data structure plus the file helpers shared with the
//! book store: atomic replacement and timestamped backup folders.

pub mod error;
pub mod files;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use files::{write_atomic, BackupFolder};
pub use manager::ConfigManager;
pub use model::{Config, DeliveryPreference, Layout};
