use serde::{de::Deserializer, Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::ConfigError;

/// Stores operator preferences for batch printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub delivery_mode: DeliveryPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_folder: Option<PathBuf>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "Config::default_auto_number")]
    pub auto_number: bool,
    #[serde(default = "Config::default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "Config::default_spool_delay_ms")]
    pub spool_delay_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional directory for the book file. Defaults to the application home.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryPreference::default(),
            printer_name: None,
            export_folder: None,
            layout: Layout::default(),
            auto_number: Self::default_auto_number(),
            settle_delay_ms: Self::default_settle_delay_ms(),
            spool_delay_ms: Self::default_spool_delay_ms(),
            data_root: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 8] = [
        "delivery_mode",
        "printer_name",
        "export_folder",
        "layout",
        "auto_number",
        "settle_delay_ms",
        "spool_delay_ms",
        "data_root",
    ];

    pub fn default_auto_number() -> bool {
        true
    }

    pub fn default_settle_delay_ms() -> u64 {
        350
    }

    pub fn default_spool_delay_ms() -> u64 {
        1200
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn spool_delay(&self) -> Duration {
        Duration::from_millis(self.spool_delay_ms)
    }

    pub fn resolve_data_root(&self, home: &Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => home.to_path_buf(),
        }
    }

    /// Updates one field from its textual form. An empty value clears
    /// optional fields.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "delivery_mode" => {
                self.delivery_mode = DeliveryPreference::parse(value).ok_or_else(invalid)?
            }
            "printer_name" => self.printer_name = optional_text(value),
            "export_folder" => self.export_folder = optional_text(value).map(PathBuf::from),
            "layout" => self.layout = Layout::parse(value).ok_or_else(invalid)?,
            "auto_number" => self.auto_number = parse_flag(value).ok_or_else(invalid)?,
            "settle_delay_ms" => self.settle_delay_ms = value.parse().map_err(|_| invalid())?,
            "spool_delay_ms" => self.spool_delay_ms = value.parse().map_err(|_| invalid())?,
            "data_root" => self.data_root = optional_text(value).map(PathBuf::from),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// `(key, value)` pairs for display, in [`Config::KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let path = |value: &Option<PathBuf>| {
            value
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        vec![
            ("delivery_mode", self.delivery_mode.to_string()),
            ("printer_name", self.printer_name.clone().unwrap_or_default()),
            ("export_folder", path(&self.export_folder)),
            ("layout", self.layout.to_string()),
            ("auto_number", self.auto_number.to_string()),
            ("settle_delay_ms", self.settle_delay_ms.to_string()),
            ("spool_delay_ms", self.spool_delay_ms.to_string()),
            ("data_root", path(&self.data_root)),
        ]
    }
}

fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Saved delivery preference; the printer and folder live beside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPreference {
    #[default]
    Interactive,
    Silent,
    Pdf,
}

impl DeliveryPreference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "interactive" | "dialog" => Some(DeliveryPreference::Interactive),
            "silent" => Some(DeliveryPreference::Silent),
            "pdf" | "pdf_export" | "pdf-export" => Some(DeliveryPreference::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeliveryPreference::Interactive => "interactive",
            DeliveryPreference::Silent => "silent",
            DeliveryPreference::Pdf => "pdf",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for DeliveryPreference {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .and_then(|v| DeliveryPreference::parse(&v))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Standard,
    ThreeUp,
}

impl Layout {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "single" => Some(Layout::Standard),
            "three_up" | "three-up" | "threeup" | "sheet" => Some(Layout::ThreeUp),
            _ => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Layout::Standard => "standard",
            Layout::ThreeUp => "three_up",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.and_then(|v| Layout::parse(&v)).unwrap_or_default())
    }
}
