//! Stock-sheet ingestion engine
//!
//! Turns a party-grouped stock sheet into an ordered batch of
//! [`StockRecord`]s in one forward pass:
//!
//! - [`SheetLoader`] reads the first sheet as raw rows
//! - [`classifier`] tags each row as party header, junk, data or skip
//! - [`cleaner`] converts raw cells to typed fields
//! - [`Assembler`] carries the current party and builds records
//!
//! The result is all-or-nothing: either every data row became a record, or
//! the first fatal [`IngestError`] in sheet order is returned and nothing
//! else. All state lives inside one call, so concurrent ingestions are
//! independent.

pub mod assembler;
pub mod classifier;
pub mod cleaner;

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

pub use assembler::{Assembler, PartyState};
pub use classifier::{classify, RowKind};

use crate::error::IngestResult;
use crate::excel::SheetLoader;
use crate::types::{RawRow, StockRecord};

/// Run the assembler over already-loaded rows.
pub fn ingest_rows<I>(rows: I) -> IngestResult<Vec<StockRecord>>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut assembler = Assembler::new();
    for row in rows {
        assembler.push(&row)?;
    }
    let skipped = assembler.skipped();
    let records = assembler.finish()?;
    info!(
        records = records.len(),
        parties = distinct_parties(&records),
        skipped,
        "stock sheet ingested"
    );
    Ok(records)
}

fn distinct_parties(records: &[StockRecord]) -> usize {
    records
        .iter()
        .map(|r| r.party_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Ingest the first sheet of a workbook on disk.
pub fn ingest_path<P: AsRef<Path>>(path: P) -> IngestResult<Vec<StockRecord>> {
    ingest_rows(SheetLoader::from_path(path).load()?)
}

/// Ingest the first sheet of an uploaded workbook.
pub fn ingest_bytes(bytes: impl Into<Vec<u8>>) -> IngestResult<Vec<StockRecord>> {
    ingest_rows(SheetLoader::from_bytes(bytes).load()?)
}
