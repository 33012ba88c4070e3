use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use kakeibo::chart::TextBarChart;
use kakeibo::config::Settings;
use kakeibo::errors::Error;
use kakeibo::io::{self, CsvFileStore};
use kakeibo::session::Session;
use kakeibo::types::{LedgerStore, LoadOutcome, MemoryStore, SaveOutcome, TextEncoding};

#[derive(Parser)]
#[command(
    name = "kakeibo",
    version,
    about = "Household ledger: record income and expenses, see the balance and category totals"
)]
struct Cli {
    /// Ledger file
    #[arg(short, long, env = "KAKEIBO_FILE")]
    file: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, env = "KAKEIBO_CONFIG")]
    config: Option<PathBuf>,

    /// Text encoding of the ledger file, e.g. utf-8 or cp932
    #[arg(short, long)]
    encoding: Option<TextEncoding>,

    /// Category counted as income (repeatable; replaces the configured list)
    #[arg(short, long = "income", value_name = "CATEGORY")]
    income: Vec<String>,

    /// Never write the ledger file
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Shell,
    /// Append one record and save
    Add {
        /// Date of the entry, e.g. 2025-10-28
        date: String,
        /// Category, e.g. 食費 or 給与
        category: String,
        /// Whole-number amount
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Print the balance
    Balance,
    /// Print the category chart
    Chart,
    /// Print every record
    List,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(file) = cli.file {
        settings.ledger_file = file;
    }
    if let Some(encoding) = cli.encoding {
        settings.encoding = encoding;
    }
    if !cli.income.is_empty() {
        settings.income_categories = cli.income;
    }
    debug!("Using settings {settings:?}");

    let store = CsvFileStore::new(&settings.ledger_file, settings.encoding);
    let command = cli.command.unwrap_or(Commands::Shell);
    if cli.dry_run {
        let outcome = store
            .load()
            .with_context(|| format!("Failed to load {}", store.path().display()))?;
        let store = match outcome {
            LoadOutcome::Loaded(ledger) => MemoryStore::with_records(ledger.records().to_vec()),
            LoadOutcome::Missing => MemoryStore::new(),
        };
        run(store, &settings, command)
    } else {
        run(store, &settings, command)
    }
}

fn run<S: LedgerStore>(store: S, settings: &Settings, command: Commands) -> Result<()> {
    let chart = TextBarChart::new(std::io::stdout(), settings.chart_width);
    let mut session = Session::open(store, settings.income_rule(), chart).with_context(|| {
        format!("Failed to load ledger {}", settings.ledger_file.display())
    })?;

    match command {
        Commands::Shell => {
            let stdin = std::io::stdin().lock();
            session.run(stdin, std::io::stdout())?;
        }
        Commands::Add {
            date,
            category,
            amount,
        } => {
            let record = session.add(&date, &category, &amount)?;
            println!(
                "Added {} {} on {}.",
                record.category(),
                record.amount(),
                record.date()
            );
            match session.save().context("Failed to save ledger")? {
                SaveOutcome::Saved(count) => println!("Saved {count} records."),
                SaveOutcome::NothingToSave => println!("Nothing to save."),
            }
        }
        Commands::Balance => match session.balance() {
            Ok(report) => {
                println!("{}", report.balance);
                if report.skipped > 0 {
                    eprintln!(
                        "{} record(s) with a malformed amount were left out.",
                        report.skipped
                    );
                }
            }
            Err(Error::EmptyLedger) => println!("No records yet."),
            Err(err) => return Err(err.into()),
        },
        Commands::Chart => session.show_chart()?,
        Commands::List => {
            io::write_records_to_csv(std::io::stdout().lock(), session.ledger().records())?
        }
    }
    Ok(())
}
