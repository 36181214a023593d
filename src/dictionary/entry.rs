use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Word,
    Phrase,
}

/// Target language a learner is practicing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Telugu,
    #[default]
    Konkani,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Telugu => "Telugu",
            Language::Konkani => "Konkani",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telugu" => Ok(Language::Telugu),
            "konkani" => Ok(Language::Konkani),
            other => Err(format!("unknown language '{other}' (expected telugu or konkani)")),
        }
    }
}

/// One bilingual dictionary record. `english` is the identity key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "English")]
    pub english: String,
    #[serde(rename = "Telugu", default)]
    pub telugu: String,
    #[serde(rename = "Konkani", default)]
    pub konkani: String,
    #[serde(rename = "Type")]
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(english: &str, telugu: &str, konkani: &str, kind: EntryKind) -> Self {
        Self {
            english: english.to_string(),
            telugu: telugu.to_string(),
            konkani: konkani.to_string(),
            kind,
        }
    }

    pub fn word(english: &str, telugu: &str, konkani: &str) -> Self {
        Self::new(english, telugu, konkani, EntryKind::Word)
    }

    pub fn phrase(english: &str, telugu: &str, konkani: &str) -> Self {
        Self::new(english, telugu, konkani, EntryKind::Phrase)
    }

    pub fn identity(&self) -> &str {
        &self.english
    }

    pub fn translation(&self, language: Language) -> &str {
        match language {
            Language::Telugu => &self.telugu,
            Language::Konkani => &self.konkani,
        }
    }

    pub fn same_identity(&self, other: &Entry) -> bool {
        self.english == other.english
    }
}
