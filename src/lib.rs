#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// Drawing category totals
pub mod chart;
/// User settings
pub mod config;
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Functions for reading and writing ledger files
pub mod io;
/// Business logic for balances and category totals
mod ops;
/// The interactive menu
pub mod session;
/// Data types used throughout the ledger
pub mod types;
