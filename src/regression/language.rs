//! Languages and the language allow-list
//!
//! Every algorithm may ship in several language variants. The allow-list is read
//! once from the configuration store and restricts which variants get a case.

use crate::regression::config_store::{keys, ConfigStore};
use crate::regression::error::HarnessError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Execution variant of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    CSharp,
    FSharp,
    VisualBasic,
    Java,
    Python,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::CSharp,
        Language::FSharp,
        Language::VisualBasic,
        Language::Java,
        Language::Python,
    ];

    /// Canonical name, also used as the first half of a case identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Language::CSharp => "CSharp",
            Language::FSharp => "FSharp",
            Language::VisualBasic => "VisualBasic",
            Language::Java => "Java",
            Language::Python => "Python",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Ok(Language::CSharp),
            "fsharp" | "f#" | "fs" => Ok(Language::FSharp),
            "visualbasic" | "vb" => Ok(Language::VisualBasic),
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            _ => Err(HarnessError::UnknownLanguage(s.trim().to_string())),
        }
    }
}

/// Languages generated when nothing else is configured.
pub const DEFAULT_LANGUAGES: [Language; 2] = [Language::CSharp, Language::Python];

/// Process-wide set of languages to generate cases for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageAllowList {
    languages: BTreeSet<Language>,
}

impl Default for LanguageAllowList {
    fn default() -> Self {
        Self { languages: DEFAULT_LANGUAGES.into_iter().collect() }
    }
}

impl LanguageAllowList {
    pub fn new(languages: impl IntoIterator<Item = Language>) -> Result<Self, HarnessError> {
        let languages: BTreeSet<Language> = languages.into_iter().collect();
        if languages.is_empty() {
            return Err(HarnessError::EmptyAllowList);
        }
        Ok(Self { languages })
    }

    /// Parse a comma separated list. A blank value means the default baseline.
    pub fn parse(raw: &str) -> Result<Self, HarnessError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let languages = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Language::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(languages)
    }

    /// Read the allow-list from the configuration store.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, HarnessError> {
        match store.get(keys::TEST_LANGUAGES) {
            Some(raw) => Self::parse(&raw),
            None => Ok(Self::default()),
        }
    }

    pub fn contains(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    /// Languages both supported and allowed, in canonical name order.
    pub fn intersect(&self, supported: &BTreeSet<Language>) -> Vec<Language> {
        let mut languages: Vec<Language> =
            supported.intersection(&self.languages).copied().collect();
        languages.sort_by_key(|language| language.as_str());
        languages
    }

    pub fn iter(&self) -> impl Iterator<Item = Language> + '_ {
        self.languages.iter().copied()
    }
}

impl std::fmt::Display for LanguageAllowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.languages.iter().map(|l| l.as_str()).collect();
        f.write_str(&names.join(","))
    }
}
