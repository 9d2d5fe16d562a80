//! Shared traits and name helpers.

use uuid::Uuid;

/// Exposes a stable identifier for entities stored in the book.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Folds a free-text name into the form used for case-insensitive lookups.
///
/// Surrounding whitespace is ignored and the comparison is Unicode-lowercase,
/// so `" Ops "`, `"ops"` and `"OPS"` share one key.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Returns the trimmed name when it carries any visible characters.
pub fn non_blank(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|value| !value.is_empty())
}
