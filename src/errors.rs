/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reading or writing CSV data; could wrap IO or parsing errors
    #[error("Error processing CSV: {0}")]
    Csv(#[from] csv::Error),
    /// Error reading or writing the ledger file or the terminal
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file could not be parsed
    #[error("Invalid settings file: {0}")]
    Settings(#[from] serde_json::Error),
    /// An amount, stored or entered, is not an integer
    #[error("Amount {0:?} is not an integer")]
    MalformedAmount(String),
    /// The operation needs at least one [`Record`](crate::types::Record)
    #[error("The ledger has no records")]
    EmptyLedger,
    /// The ledger file contains bytes that are invalid in the configured encoding
    #[error("Ledger file is not valid {0}")]
    Decode(&'static str),
    /// A record contains characters the configured encoding cannot represent
    #[error("Ledger contains characters that cannot be written as {0}")]
    Encode(&'static str),
    /// The encoding label is unknown, or names an encoding that cannot be written
    #[error("Unsupported text encoding {0:?}")]
    UnsupportedEncoding(String),
}
