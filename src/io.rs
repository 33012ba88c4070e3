//! Helpers for reading and writing ledger files

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use csv::Trim;
use log::{debug, info, warn};

use crate::{
    errors::Error,
    types::{Ledger, LedgerStore, LoadOutcome, Record, SaveOutcome, TextEncoding},
};

/// Loads records from a CSV-formatted stream, in file order.
///
/// Expects input data in this format (including header):
/// ```csv
/// date,category,amount
/// 2025-10-28,食費,1200
/// 2025-11-01,給与,250000
/// ```
///
/// Columns are matched by header name, and files written with the old `data` header
/// are accepted too. Amounts are kept as text and not checked here. A row missing
/// any of the three fields is logged and left out.
pub fn read_records_from_csv<R: Read>(reader: R) -> Result<Vec<Record>, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize::<Record>() {
        match row {
            Ok(record) => records.push(record),
            Err(err) if matches!(err.kind(), csv::ErrorKind::Deserialize { .. }) => {
                warn!("Ignoring incomplete ledger row: {err}");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(records)
}

/// Outputs records as CSV, with a `date,category,amount` header and one row per record.
pub fn write_records_to_csv<W: Write>(writer: W, records: &[Record]) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Decodes raw file contents, dropping a leading byte order mark.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String, Error> {
    let (text, had_errors) = encoding.0.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(Error::Decode(encoding.name()));
    }
    Ok(text.into_owned())
}

/// Encodes text for writing, refusing characters the encoding cannot represent.
pub fn encode(text: &str, encoding: TextEncoding) -> Result<Vec<u8>, Error> {
    let (bytes, _, had_unmappable) = encoding.0.encode(text);
    if had_unmappable {
        return Err(Error::Encode(encoding.name()));
    }
    Ok(bytes.into_owned())
}

/// Persists the ledger as a single CSV file.
///
/// Every load reads the whole file and every save replaces it. Writes go to a
/// sibling `.tmp` file first, which is then renamed over the ledger, so a failed
/// save leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    /// Location of the ledger file
    path: PathBuf,
    /// Encoding used for both reading and writing
    encoding: TextEncoding,
}

impl CsvFileStore {
    /// Creates a store for the file at `path`; nothing is touched until the first load or save
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, encoding: TextEncoding) -> Self {
        Self {
            path: path.into(),
            encoding,
        }
    }

    /// Returns the location of the ledger file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the encoding used for the ledger file
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.temp_path();
        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        written
            .and_then(|()| fs::rename(&temp_path, &self.path))
            .map_err(|err| {
                let _ = fs::remove_file(&temp_path);
                Error::Io(err)
            })
    }
}

impl LedgerStore for CsvFileStore {
    fn load(&self) -> Result<LoadOutcome, Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No ledger at {}, starting empty", self.path.display());
                return Ok(LoadOutcome::Missing);
            }
            Err(err) => return Err(err.into()),
        };
        let text = decode(&bytes, self.encoding)?;
        let records = read_records_from_csv(text.as_bytes())?;
        info!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(LoadOutcome::Loaded(Ledger::from(records)))
    }

    fn save(&mut self, records: &[Record]) -> Result<SaveOutcome, Error> {
        if records.is_empty() {
            debug!("Nothing to save to {}", self.path.display());
            return Ok(SaveOutcome::NothingToSave);
        }
        let mut text = Vec::new();
        write_records_to_csv(&mut text, records)?;
        let text = String::from_utf8(text)
            .map_err(|err| Error::Io(std::io::Error::new(ErrorKind::InvalidData, err)))?;
        let bytes = encode(&text, self.encoding)?;
        self.write_atomic(&bytes)?;
        info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(SaveOutcome::Saved(records.len()))
    }
}
