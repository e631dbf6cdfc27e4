use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Guess,
    Words,
    Students,
    Atm,
    Contacts,
}

impl AppKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guess => "guess",
            Self::Words => "words",
            Self::Students => "students",
            Self::Atm => "atm",
            Self::Contacts => "contacts",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Guess => "Number Guessing Game",
            Self::Words => "Word Counter",
            Self::Students => "Student Management System",
            Self::Atm => "ATM Machine",
            Self::Contacts => "Address Book System",
        }
    }

    pub fn persists_records(self) -> bool {
        matches!(self, Self::Students | Self::Contacts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeScope {
    pub working_dir: PathBuf,
}
