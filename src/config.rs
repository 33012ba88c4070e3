//! User settings for the ledger
//!
//! Settings come from an optional JSON file; every field may be left out:
//! ```json
//! {
//!   "ledger_file": "kakeibo.csv",
//!   "encoding": "cp932",
//!   "income_categories": ["給与", "賞与"],
//!   "chart_width": 40
//! }
//! ```
//! Command-line options override whatever the file says.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    chart::DEFAULT_CHART_WIDTH,
    errors::Error,
    types::{IncomeRule, TextEncoding, DEFAULT_INCOME_CATEGORY},
};

/// Ledger file used when nothing else is configured
pub const DEFAULT_LEDGER_FILE: &str = "kakeibo.csv";

/// Resolved configuration for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the ledger is stored
    pub ledger_file: PathBuf,
    /// Text encoding of the ledger file
    pub encoding: TextEncoding,
    /// Categories counted as income
    pub income_categories: Vec<String>,
    /// Length of the longest bar in the category chart
    pub chart_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ledger_file: PathBuf::from(DEFAULT_LEDGER_FILE),
            encoding: TextEncoding::default(),
            income_categories: vec![DEFAULT_INCOME_CATEGORY.to_string()],
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

impl Settings {
    /// Reads settings from `path`, or returns the defaults when no path is given.
    /// # Errors
    /// [`Error::Io`] if the file cannot be opened, [`Error::Settings`] if it is not valid
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = File::open(path)?;
        let settings = serde_json::from_reader(BufReader::new(file))?;
        Ok(settings)
    }

    /// Builds the [`IncomeRule`] for the configured income categories
    #[must_use]
    pub fn income_rule(&self) -> IncomeRule {
        IncomeRule::new(self.income_categories.iter().cloned())
    }
}
