use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Identifiable, NamedEntity};

pub const DEFAULT_FIRST_CHECK_NUMBER: u64 = 1001;

/// Check-writing profile. Owns the next check number to hand out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "Profile::default_next_check_number")]
    pub next_check_number: u64,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            next_check_number: DEFAULT_FIRST_CHECK_NUMBER,
        }
    }

    pub fn with_next_check_number(mut self, number: u64) -> Self {
        self.next_check_number = number;
        self
    }

    pub fn default_next_check_number() -> u64 {
        DEFAULT_FIRST_CHECK_NUMBER
    }
}

impl Identifiable for Profile {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Profile {
    fn name(&self) -> &str {
        &self.name
    }
}
