// src/services/countries.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;

const BUNDLED: &str = include_str!("../../data/countries.json");
const UNKNOWN: &str = "Unknown";

/// Longest calling codes are four digits (e.g. the NANP islands).
const MAX_CODE_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub iso_code: String,
    pub calling_code: String,
}

impl Country {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            iso_code: UNKNOWN.to_string(),
            calling_code: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.calling_code == UNKNOWN
    }

    /// Table rows for the Turn context object.
    pub fn to_context_object(&self) -> Value {
        let calling_code = if self.is_unknown() {
            self.calling_code.clone()
        } else {
            format!("+{}", self.calling_code)
        };

        json!({
            "Country": self.name,
            "ISO code": self.iso_code,
            "Calling code": calling_code,
        })
    }
}

/// Read-only calling code table.
#[derive(Debug, Clone)]
pub struct CountryDirectory {
    by_code: HashMap<String, Country>,
}

impl CountryDirectory {
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED).context("Failed to parse bundled country table")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read country table: {path:?}"))?;
        Self::parse(&content).with_context(|| format!("Failed to parse country table: {path:?}"))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let countries: Vec<Country> = serde_json::from_str(content)?;
        let by_code = countries
            .into_iter()
            .map(|country| (country.calling_code.clone(), country))
            .collect();
        Ok(Self { by_code })
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Resolve the country of a WhatsApp id by its calling code prefix.
    pub fn lookup(&self, wa_id: &str) -> Country {
        let digits: String = wa_id.chars().filter(char::is_ascii_digit).collect();

        (1..=MAX_CODE_LEN.min(digits.len()))
            .rev()
            .find_map(|len| self.by_code.get(&digits[..len]))
            .cloned()
            .unwrap_or_else(Country::unknown)
    }
}
