//! The interactive menu driving a [`Ledger`]

use std::io::{BufRead, Write};

use log::{debug, info};

use crate::{
    chart::ChartSink,
    errors::Error,
    types::{
        BalanceReport, CategoryTotals, IncomeRule, Ledger, LedgerStore, LoadOutcome, Record,
        SaveOutcome,
    },
};

const MENU: &str = "1: add record | 2: show balance | 3: show category chart | q: save and quit";

/// One run of the application: the ledger plus everything operations on it need.
///
/// The ledger lives here and nowhere else; it is loaded once when the session
/// opens, grows only through [`Session::add`], and is written back by [`Session::save`].
#[derive(Debug)]
pub struct Session<S, C> {
    ledger: Ledger,
    store: S,
    rule: IncomeRule,
    chart: C,
    fresh: bool,
}

impl<S: LedgerStore, C: ChartSink> Session<S, C> {
    /// Starts a session with whatever `store` holds; a store with no saved ledger gives an empty one.
    /// # Errors
    /// Any error from [`LedgerStore::load`] other than a missing ledger
    pub fn open(store: S, rule: IncomeRule, chart: C) -> Result<Self, Error> {
        let outcome = store.load()?;
        let fresh = outcome == LoadOutcome::Missing;
        Ok(Self {
            ledger: outcome.into_ledger(),
            store,
            rule,
            chart,
            fresh,
        })
    }

    /// Returns the ledger as it currently stands in memory
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns the backing store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the chart sink
    #[must_use]
    pub fn chart(&self) -> &C {
        &self.chart
    }

    /// Returns whether the store had no saved ledger when the session opened
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Appends a record; see [`Ledger::add`]
    pub fn add(&mut self, date: &str, category: &str, amount: &str) -> Result<&Record, Error> {
        self.ledger.add(date, category, amount)
    }

    /// Computes the balance with the session's income rule; see [`Ledger::balance_report`]
    pub fn balance(&self) -> Result<BalanceReport, Error> {
        self.ledger.balance_report(&self.rule)
    }

    /// Sums amounts per category
    pub fn category_totals(&self) -> CategoryTotals {
        self.ledger.category_totals()
    }

    /// Sends the category totals to the chart sink
    pub fn show_chart(&mut self) -> Result<(), Error> {
        let totals = self.ledger.category_totals();
        self.chart.render(&totals)
    }

    /// Writes the whole ledger to the store. On failure the in-memory ledger is untouched.
    pub fn save(&mut self) -> Result<SaveOutcome, Error> {
        self.store.save(self.ledger.records())
    }

    /// Runs the menu loop until the user quits or `input` ends.
    ///
    /// Problems with individual operations are reported on `output` and the menu comes
    /// back. Quitting always saves first; if that save fails the menu comes back too, so
    /// the user can retry. At the end of input there is no one left to retry, so a failed
    /// save is returned.
    /// # Errors
    /// Reading `input` or writing `output` failed, or the final save at end of input failed
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<(), Error> {
        if self.fresh {
            writeln!(output, "No saved ledger found, starting a new one.")?;
        } else {
            writeln!(output, "Loaded {} records.", self.ledger.len())?;
        }
        loop {
            writeln!(output, "\n{MENU}")?;
            let Some(choice) = prompt(&mut input, &mut output, "Choice: ")? else {
                info!("Input closed, saving and exiting");
                return match self.save() {
                    Ok(outcome) => report_save(&mut output, outcome),
                    Err(err) => {
                        writeln!(output, "Could not save the ledger: {err}")?;
                        Err(err)
                    }
                };
            };
            debug!("Menu choice {choice:?}");
            match choice.as_str() {
                "1" => self.add_interactively(&mut input, &mut output)?,
                "2" => self.print_balance(&mut output)?,
                "3" => {
                    output.flush()?;
                    if let Err(err) = self.show_chart() {
                        writeln!(output, "Could not draw the chart: {err}")?;
                    }
                }
                "q" | "Q" => match self.save() {
                    Ok(outcome) => {
                        report_save(&mut output, outcome)?;
                        writeln!(output, "Bye!")?;
                        return Ok(());
                    }
                    Err(err) => writeln!(
                        output,
                        "Could not save the ledger: {err}\n\
                         Your records are still here; enter q to try again."
                    )?,
                },
                other => writeln!(output, "Invalid choice {other:?}. Enter 1, 2, 3 or q.")?,
            }
        }
    }

    fn add_interactively<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), Error> {
        let Some(date) = prompt(input, output, "Date (e.g. 2025-10-28): ")? else {
            return Ok(());
        };
        let Some(category) = prompt(input, output, "Category (e.g. 食費, 給与): ")? else {
            return Ok(());
        };
        let Some(amount) = prompt(input, output, "Amount: ")? else {
            return Ok(());
        };
        match self.add(&date, &category, &amount) {
            Ok(record) => writeln!(
                output,
                "Added {} {} on {}.",
                record.category(),
                record.amount(),
                record.date()
            )?,
            Err(err) => writeln!(output, "{err}; the record was not added.")?,
        }
        Ok(())
    }

    fn print_balance<W: Write>(&self, output: &mut W) -> Result<(), Error> {
        match self.balance() {
            Ok(report) => {
                writeln!(
                    output,
                    "Balance: {} (income {}, expenses {})",
                    report.balance, report.income, report.expense
                )?;
                if report.skipped > 0 {
                    writeln!(
                        output,
                        "{} record(s) with a malformed amount were left out.",
                        report.skipped
                    )?;
                }
            }
            Err(Error::EmptyLedger) => writeln!(output, "No records yet.")?,
            Err(err) => writeln!(output, "Could not compute the balance: {err}")?,
        }
        Ok(())
    }
}

/// Writes a prompt and reads one trimmed line; `None` once input has ended.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<Option<String>, Error> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn report_save<W: Write>(output: &mut W, outcome: SaveOutcome) -> Result<(), Error> {
    match outcome {
        SaveOutcome::Saved(count) => writeln!(output, "Saved {count} records.")?,
        SaveOutcome::NothingToSave => writeln!(output, "Nothing to save.")?,
    }
    Ok(())
}
