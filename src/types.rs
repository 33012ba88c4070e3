//! Common datatypes supporting functions throughout the household ledger

use std::{
    collections::{btree_map, BTreeMap, BTreeSet},
    fmt::Display,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// The category that counts as income when nothing else is configured ("salary")
pub const DEFAULT_INCOME_CATEGORY: &str = "給与";

/// Sum of many amounts.
///
/// Every single amount fits in an `i64`, but a sum of them may not.
pub type Total = i128;

/// The monetary amount of a [`Record`], kept exactly as it was entered or stored.
///
/// Amounts read back from a ledger file are not validated at load time, so a
/// malformed value survives a load/save cycle untouched and is only rejected
/// when something needs its numeric [`value`](Amount::value).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Amount(pub(crate) String);

impl Amount {
    /// Parses the stored text as a whole number.
    /// # Errors
    /// [`Error::MalformedAmount`] if the text is not an integer
    pub fn value(&self) -> Result<i64, Error> {
        self.0
            .trim()
            .parse()
            .map_err(|_| Error::MalformedAmount(self.0.clone()))
    }

    /// Returns the amount as it is stored
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for Amount {
    fn from(amount: i64) -> Self {
        Self(amount.to_string())
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One dated, categorized ledger entry.
///
/// Records are never edited in place; the ledger only ever grows by appending.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Record {
    /// Free-form date text; no format is enforced
    #[serde(alias = "data")]
    pub(crate) date: String,
    /// Free-form category, also used to tell income from expense (see [`IncomeRule`])
    pub(crate) category: String,
    /// The amount of money in this entry
    pub(crate) amount: Amount,
}

impl Record {
    /// Creates a new record
    #[must_use]
    pub fn new(date: impl Into<String>, category: impl Into<String>, amount: Amount) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            amount,
        }
    }

    /// Returns the date of the entry
    #[must_use]
    #[inline]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Returns the category of the entry
    #[must_use]
    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the amount of the entry
    #[must_use]
    #[inline]
    pub fn amount(&self) -> &Amount {
        &self.amount
    }
}

/// The ordered collection of every [`Record`] of a session.
///
/// Insertion order is preserved and duplicates are allowed; records carry no identifier.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    /// Storage for the records, oldest first
    pub(crate) records: Vec<Record>,
}

impl Ledger {
    /// Creates a new, empty [`Ledger`]
    #[must_use]
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Returns the number of records
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the ledger has no records
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns all records in insertion order
    #[must_use]
    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl From<Vec<Record>> for Ledger {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Decides which categories count as income; every other category is an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeRule {
    categories: BTreeSet<String>,
}

impl IncomeRule {
    /// Creates a rule treating exactly the given categories as income
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns whether entries in `category` add to the balance
    #[must_use]
    #[inline]
    pub fn is_income(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}

impl Default for IncomeRule {
    fn default() -> Self {
        Self::new([DEFAULT_INCOME_CATEGORY])
    }
}

/// Summed amounts per distinct category, ordered by category name
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotals(pub(crate) BTreeMap<String, Total>);

impl CategoryTotals {
    /// Returns the total for a category, if it appears in the ledger
    #[must_use]
    pub fn get(&self, category: &str) -> Option<Total> {
        self.0.get(category).copied()
    }

    /// Returns the number of distinct categories
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no categories at all
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(category, total)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, Total)> {
        self.0.iter().map(|(category, total)| (category.as_str(), *total))
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = (&'a String, &'a Total);
    type IntoIter = btree_map::Iter<'a, String, Total>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outcome of folding a ledger into a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceReport {
    /// Income minus expenses
    pub balance: Total,
    /// Sum of all income entries
    pub income: Total,
    /// Sum of all expense entries
    pub expense: Total,
    /// Number of records left out because their amount is not an integer
    pub skipped: usize,
}

/// Result of [`LedgerStore::load`]
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were read from storage
    Loaded(Ledger),
    /// Nothing has been stored yet; the session starts with an empty ledger
    Missing,
}

impl LoadOutcome {
    /// Returns the loaded ledger, or an empty one when nothing was stored
    #[must_use]
    pub fn into_ledger(self) -> Ledger {
        match self {
            LoadOutcome::Loaded(ledger) => ledger,
            LoadOutcome::Missing => Ledger::new(),
        }
    }
}

/// Result of [`LedgerStore::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The whole ledger was written, replacing what was stored before
    Saved(usize),
    /// The ledger was empty, so storage was left alone
    NothingToSave,
}

/// An interface to wherever the ledger is persisted
pub trait LedgerStore {
    /// Reads every stored record.
    ///
    /// A store that has never been written returns [`LoadOutcome::Missing`] rather than an error.
    fn load(&self) -> Result<LoadOutcome, Error>;

    /// Replaces the stored ledger with `records` in one shot.
    ///
    /// Saving an empty slice is a no-op reporting [`SaveOutcome::NothingToSave`].
    fn save(&mut self, records: &[Record]) -> Result<SaveOutcome, Error>;
}

/// Holds the persisted ledger in memory.
///
/// # Limitations
/// No persistence beyond the lifetime of the value.
#[derive(Default, Debug)]
pub struct MemoryStore {
    /// The last saved records, or `None` if nothing has been saved yet
    pub(crate) records: Option<Vec<Record>>,
}

impl MemoryStore {
    /// Creates a new, empty [`MemoryStore`]
    #[must_use]
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Creates a [`MemoryStore`] that already holds `records`
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Some(records),
        }
    }

    /// Returns the last saved records
    #[must_use]
    pub fn saved(&self) -> Option<&[Record]> {
        self.records.as_deref()
    }
}

/// Text encoding used for the ledger file on both load and save.
///
/// Chosen by [WHATWG label](https://encoding.spec.whatwg.org/#names-and-labels),
/// e.g. `utf-8`, `shift_jis` or `cp932`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextEncoding(pub(crate) &'static encoding_rs::Encoding);

impl TextEncoding {
    /// Returns the canonical name of the encoding
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self(encoding_rs::UTF_8)
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let lookup = match label.trim() {
            // Windows code page name, not a WHATWG label
            cp if cp.eq_ignore_ascii_case("cp932") => "windows-31j",
            other => other,
        };
        match encoding_rs::Encoding::for_label(lookup.as_bytes()) {
            // UTF-16 and "replacement" encode as UTF-8, so a saved file would not load back
            Some(encoding) if encoding.output_encoding() == encoding => Ok(Self(encoding)),
            _ => Err(Error::UnsupportedEncoding(label.to_string())),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = Error;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(encoding: TextEncoding) -> Self {
        encoding.name().to_string()
    }
}

impl Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
