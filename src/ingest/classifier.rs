//! Row classification for stock sheets

use calamine::Data;

use super::cleaner::{cell_text, truncate_to_i64};
use crate::types::{col, RawRow};

/// Column-0 markers of rows that carry no data
const JUNK_MARKERS: [&str; 3] = ["PARTY TOTAL", "S NO", ""];

/// What a sheet row is, judged from its first three columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Starts a new party group; holds the raw column-0 text
    PartyHeader(String),
    /// Column headings, subtotals and blank rows
    Junk,
    /// An inventory lot with its declared sequence number
    Data(i64),
    /// Anything else; dropped without error
    Skip,
}

/// Classify a row. Checks run in order and the first match wins:
/// party header, junk, data, skip.
///
/// Header rows carry free text in column 0, so header detection has to run
/// before the sequence-number parse.
pub fn classify(row: &RawRow) -> RowKind {
    let first = cell_text(row.cell(col::S_NO));
    let first = first.trim();
    let first_upper = first.to_uppercase();

    if !first.is_empty()
        && is_empty_cell(row.cell(col::BANK))
        && is_empty_cell(row.cell(col::LOT_NO))
        && !first_upper.contains("TOTAL")
    {
        return RowKind::PartyHeader(first.to_string());
    }

    if JUNK_MARKERS.contains(&first_upper.as_str()) {
        return RowKind::Junk;
    }

    match sequence_number(row.cell(col::S_NO)) {
        Some(s_no) => RowKind::Data(s_no),
        None => RowKind::Skip,
    }
}

fn is_empty_cell(cell: &Data) -> bool {
    cell_text(cell).trim().is_empty()
}

/// Integer value of a column-0 cell: integer cells, numeric cells
/// truncated toward zero, or text that parses as a base-10 integer.
pub fn sequence_number(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => truncate_to_i64(*f),
        Data::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
