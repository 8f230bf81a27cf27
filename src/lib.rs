//! Stockledger - stock sheet ingestion for a multi-tenant inventory dashboard
//!
//! This library turns a party-grouped stock spreadsheet into a clean,
//! ordered list of stock records, or a single error that rejects the batch.
//!
//! # Features
//!
//! - Reads the first sheet of xlsx, xlsm, xlsb, xls and ods workbooks
//! - Party header rows carry the party name down to the stock rows below
//! - Placeholder cleanup (`-`, `N/A`, `NA`) and day-first date parsing
//! - All-or-nothing ingestion with row-precise errors
//! - Ledger export back to the same grouped layout
//! - Persistence boundary that books records against client accounts
//!
//! # Example
//!
//! ```no_run
//! use stockledger::ingest_path;
//! use stockledger::types::IngestSummary;
//!
//! let records = ingest_path("stock.xlsx")?;
//! let summary = IngestSummary::from_records(&records);
//!
//! println!("Records: {}", summary.record_count);
//! println!("Parties: {}", summary.parties.len());
//! # Ok::<(), stockledger::error::IngestError>(())
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod excel;
pub mod ingest;
pub mod ledger;
pub mod types;

// Re-export commonly used types
pub use error::{IngestError, IngestResult, LedgerError, LedgerResult};
pub use ingest::{ingest_bytes, ingest_path, ingest_rows};
pub use types::{IngestSummary, RawRow, StockRecord};
