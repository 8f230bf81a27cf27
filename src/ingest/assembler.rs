//! Record assembly - classified rows → stock records
//!
//! The assembler is the only stateful stage: it carries the active party
//! from header rows down to the data rows beneath them.

use tracing::{debug, warn};

use super::classifier::{classify, RowKind};
use super::cleaner::{clean_date, clean_float, clean_int, clean_string, normalize_party};
use crate::error::{IngestError, IngestResult};
use crate::types::{col, RawRow, StockRecord};

/// Party context while scanning a sheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartyState {
    #[default]
    NoParty,
    HasParty(String),
}

/// Row-by-row builder for one ingestion run.
///
/// Feed rows in sheet order with [`Assembler::push`], then call
/// [`Assembler::finish`]. Any error from `push` ends the run; the assembler
/// should be dropped along with everything it collected.
#[derive(Debug, Default)]
pub struct Assembler {
    state: PartyState,
    records: Vec<StockRecord>,
    skipped: usize,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PartyState {
        &self.state
    }

    /// Number of stray rows dropped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn push(&mut self, row: &RawRow) -> IngestResult<()> {
        match classify(row) {
            RowKind::PartyHeader(text) => {
                let party = normalize_party(&text);
                debug!(row = row.index, party = %party, "party header");
                self.state = PartyState::HasParty(party);
            }
            RowKind::Junk => {}
            RowKind::Skip => {
                debug!(row = row.index, "skipping unrecognised row");
                self.skipped += 1;
            }
            RowKind::Data(s_no) => {
                let PartyState::HasParty(party) = &self.state else {
                    warn!(row = row.index, "data row before any party header");
                    return Err(IngestError::MissingParty { row: row.index });
                };
                let record = build_record(party, s_no, row)?;
                self.records.push(record);
            }
        }
        Ok(())
    }

    /// Close the run. A sheet with no data rows is an error, not an
    /// empty success.
    pub fn finish(self) -> IngestResult<Vec<StockRecord>> {
        if self.records.is_empty() {
            return Err(IngestError::EmptyResult);
        }
        Ok(self.records)
    }
}

fn build_record(party: &str, s_no: i64, row: &RawRow) -> IngestResult<StockRecord> {
    let record = StockRecord {
        party_name: party.to_string(),
        s_no,
        bank: clean_string(row.cell(col::BANK)),
        lot_no: clean_string(row.cell(col::LOT_NO)),
        date: clean_date(row.cell(col::DATE)),
        mark: clean_string(row.cell(col::MARK)),
        lorry: clean_string(row.cell(col::LORRY)),
        product: clean_string(row.cell(col::PRODUCT)),
        packing: clean_float(row.cell(col::PACKING)),
        quantity: clean_int(row.cell(col::QUANTITY)),
        weight_kgs: clean_float(row.cell(col::WEIGHT_KGS)),
        chamber: clean_string(row.cell(col::CHAMBER)),
        floor: clean_string(row.cell(col::FLOOR)),
        bayee: clean_string(row.cell(col::BAYEE)),
    };

    let missing = if record.lot_no.is_empty() {
        Some("lot_no")
    } else if record.product.is_empty() {
        Some("product")
    } else {
        None
    };

    match missing {
        Some(field) => {
            warn!(row = row.index, field, "required field empty");
            Err(IngestError::RowValidation {
                row: row.index,
                field,
            })
        }
        None => Ok(record),
    }
}
