use std::collections::BTreeMap;

use log::warn;

use crate::{
    errors::Error,
    types::{
        Amount, BalanceReport, CategoryTotals, IncomeRule, Ledger, LedgerStore, LoadOutcome,
        MemoryStore, Record, SaveOutcome, Total,
    },
};

impl Ledger {
    /// Appends a new record built from user input.
    ///
    /// Date and category are taken as-is (trimmed); the amount must be a whole number.
    /// # Errors
    /// [`Error::MalformedAmount`] if `amount` is not an integer, in which case the ledger
    /// is left unchanged
    pub fn add(&mut self, date: &str, category: &str, amount: &str) -> Result<&Record, Error> {
        let amount = amount
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::MalformedAmount(amount.to_string()))?;
        self.records
            .push(Record::new(date.trim(), category.trim(), Amount::from(amount)));
        Ok(&self.records[self.records.len() - 1])
    }

    /// Income total minus expense total across the whole ledger.
    /// # Errors
    /// [`Error::EmptyLedger`] if there are no records
    pub fn balance(&self, rule: &IncomeRule) -> Result<Total, Error> {
        self.balance_report(rule).map(|report| report.balance)
    }

    /// Folds the ledger into income and expense totals.
    ///
    /// Records whose amount is not an integer contribute nothing; each one is logged
    /// and counted in [`BalanceReport::skipped`].
    /// # Errors
    /// [`Error::EmptyLedger`] if there are no records
    pub fn balance_report(&self, rule: &IncomeRule) -> Result<BalanceReport, Error> {
        if self.is_empty() {
            return Err(Error::EmptyLedger);
        }
        Ok(compute_balance(self, rule))
    }

    /// Sums amounts per category, skipping (and logging) records whose amount is not an integer.
    ///
    /// An empty ledger gives empty totals.
    #[must_use]
    pub fn category_totals(&self) -> CategoryTotals {
        aggregate_by_category(self)
    }
}

/// Returns the integer value of a record's amount, or logs why it has to be left out.
fn parsed_amount(record: &Record) -> Option<Total> {
    match record.amount.value() {
        Ok(amount) => Some(Total::from(amount)),
        Err(err) => {
            warn!(
                "Skipping {} entry dated {}: {err}",
                record.category, record.date
            );
            None
        }
    }
}

/// Does the work of folding every record into a signed total, in insertion order.
pub(crate) fn compute_balance(ledger: &Ledger, rule: &IncomeRule) -> BalanceReport {
    let mut report = BalanceReport {
        balance: 0,
        income: 0,
        expense: 0,
        skipped: 0,
    };
    for record in ledger {
        let Some(amount) = parsed_amount(record) else {
            report.skipped += 1;
            continue;
        };
        if rule.is_income(&record.category) {
            report.income += amount;
        } else {
            report.expense += amount;
        }
    }
    report.balance = report.income - report.expense;
    report
}

/// Groups records by exact category text and sums each group.
pub(crate) fn aggregate_by_category(ledger: &Ledger) -> CategoryTotals {
    let mut totals = BTreeMap::new();
    for record in ledger {
        if let Some(amount) = parsed_amount(record) {
            *totals.entry(record.category.clone()).or_insert(0) += amount;
        }
    }
    CategoryTotals(totals)
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<LoadOutcome, Error> {
        Ok(match &self.records {
            Some(records) => LoadOutcome::Loaded(Ledger::from(records.clone())),
            None => LoadOutcome::Missing,
        })
    }

    fn save(&mut self, records: &[Record]) -> Result<SaveOutcome, Error> {
        if records.is_empty() {
            return Ok(SaveOutcome::NothingToSave);
        }
        self.records = Some(records.to_vec());
        Ok(SaveOutcome::Saved(records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, category: &str, amount: &str) -> Record {
        Record::new(date, category, Amount(amount.to_string()))
    }

    fn sample_ledger() -> Ledger {
        Ledger::from(vec![
            record("2025-10-01", "食費", "1000"),
            record("2025-10-05", "給与", "5000"),
        ])
    }

    #[test]
    fn test_balance_scenario() {
        let ledger = sample_ledger();
        assert_eq!(ledger.balance(&IncomeRule::default()).unwrap(), 4000);
    }

    #[test]
    fn test_category_totals_scenario() {
        let totals = sample_ledger().category_totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("食費"), Some(1000));
        assert_eq!(totals.get("給与"), Some(5000));
    }

    #[test]
    fn test_balance_is_income_minus_expense() {
        let ledger = Ledger::from(vec![
            record("2025-11-01", "給与", "250000"),
            record("2025-11-02", "食費", "1200"),
            record("2025-11-03", "家賃", "80000"),
            record("2025-11-04", "給与", "-1000"),
            record("2025-11-05", "食費", "-200"),
        ]);
        let report = ledger.balance_report(&IncomeRule::default()).unwrap();
        assert_eq!(report.income, 249000);
        assert_eq!(report.expense, 81000);
        assert_eq!(report.balance, 168000);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_balance_uses_configured_rule() {
        let ledger = Ledger::from(vec![
            record("2025-11-01", "salary", "300"),
            record("2025-11-02", "給与", "100"),
        ]);
        assert_eq!(ledger.balance(&IncomeRule::new(["salary"])).unwrap(), 200);
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = Ledger::new();
        assert!(matches!(
            ledger.balance(&IncomeRule::default()),
            Err(Error::EmptyLedger)
        ));
        assert!(ledger.category_totals().is_empty());
    }

    #[test]
    fn test_malformed_amount_is_excluded_everywhere() {
        let ledger = Ledger::from(vec![
            record("2025-10-01", "食費", "1000"),
            record("2025-10-02", "食費", "abc"),
            record("2025-10-03", "交通費", "12.5"),
            record("2025-10-05", "給与", "5000"),
        ]);
        let report = ledger.balance_report(&IncomeRule::default()).unwrap();
        assert_eq!(report.balance, 4000);
        assert_eq!(report.skipped, 2);

        let totals = ledger.category_totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("食費"), Some(1000));
        assert_eq!(totals.get("交通費"), None);
    }

    #[test]
    fn test_only_malformed_amounts_still_balance_to_zero() {
        let ledger = Ledger::from(vec![record("2025-10-02", "食費", "abc")]);
        let report = ledger.balance_report(&IncomeRule::default()).unwrap();
        assert_eq!(report.balance, 0);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_totals_beyond_i64_range() {
        let mut ledger = Ledger::new();
        ledger.add("2025-12-01", "給与", "9223372036854775807").unwrap();
        ledger.add("2025-12-02", "給与", "1").unwrap();
        let report = ledger.balance_report(&IncomeRule::default()).unwrap();
        assert_eq!(report.income, Total::from(i64::MAX) + 1);
        assert_eq!(report.balance, Total::from(i64::MAX) + 1);
        assert_eq!(
            ledger.category_totals().get("給与"),
            Some(Total::from(i64::MAX) + 1)
        );

        let mut ledger = Ledger::new();
        ledger.add("2025-12-03", "食費", "-9223372036854775808").unwrap();
        ledger.add("2025-12-04", "食費", "-9223372036854775808").unwrap();
        assert_eq!(
            ledger.balance(&IncomeRule::default()).unwrap(),
            -2 * Total::from(i64::MIN)
        );
        assert_eq!(
            ledger.category_totals().get("食費"),
            Some(2 * Total::from(i64::MIN))
        );
    }

    #[test]
    fn test_categories_group_by_exact_text() {
        let ledger = Ledger::from(vec![
            record("2025-10-01", "食費", "100"),
            record("2025-10-01", "食費", "100"),
            record("2025-10-02", "食費 ", "5"),
            record("2025-10-03", "外食", "700"),
        ]);
        let totals = ledger.category_totals();
        assert_eq!(totals.len(), 3);
        assert_eq!(totals.get("食費"), Some(200));
        assert_eq!(totals.get("食費 "), Some(5));
        assert_eq!(totals.get("外食"), Some(700));
    }

    #[test]
    fn test_add_record() {
        let mut ledger = Ledger::new();
        let added = ledger.add("2025-10-28", " 食費", " 1200 ").unwrap();
        assert_eq!(added.category(), "食費");
        assert_eq!(added.amount().as_str(), "1200");
        ledger.add("2025-10-28", "食費", "1200").unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.records()[0], ledger.records()[1]);
    }

    #[test]
    fn test_add_rejects_malformed_amount() {
        let mut ledger = sample_ledger();
        for bad in ["abc", "", "12.5", "1,000"] {
            assert!(matches!(
                ledger.add("2025-10-28", "食費", bad),
                Err(Error::MalformedAmount(_))
            ));
        }
        assert_eq!(ledger, sample_ledger());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), LoadOutcome::Missing);
        assert_eq!(store.save(&[]).unwrap(), SaveOutcome::NothingToSave);
        assert!(store.saved().is_none());

        let ledger = sample_ledger();
        assert_eq!(store.save(ledger.records()).unwrap(), SaveOutcome::Saved(2));
        assert_eq!(store.load().unwrap(), LoadOutcome::Loaded(ledger));
    }
}
