use calamine::Data;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//==============================================================================
// Stock Sheet Layout
//==============================================================================

/// Every stock sheet is read as exactly this many columns.
pub const COLUMN_COUNT: usize = 13;

/// Column positions of the stock sheet layout.
pub mod col {
    pub const S_NO: usize = 0;
    pub const BANK: usize = 1;
    pub const LOT_NO: usize = 2;
    pub const DATE: usize = 3;
    pub const MARK: usize = 4;
    pub const LORRY: usize = 5;
    pub const PRODUCT: usize = 6;
    pub const PACKING: usize = 7;
    pub const QUANTITY: usize = 8;
    pub const WEIGHT_KGS: usize = 9;
    pub const CHAMBER: usize = 10;
    pub const FLOOR: usize = 11;
    pub const BAYEE: usize = 12;
}

/// Column headings as they appear on the "S NO" rows of a stock sheet
pub const COLUMN_HEADINGS: [&str; COLUMN_COUNT] = [
    "S NO", "BANK", "LOT NO", "DATE", "MARK", "LORRY", "PRODUCT", "PACKING", "QTY", "WEIGHT (KGS)",
    "CHAMBER", "FLOOR", "BAYEE",
];

//==============================================================================
// Raw Rows
//==============================================================================

/// One sheet row, untyped, always `COLUMN_COUNT` cells wide.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 0-based position of the row in the sheet
    pub index: usize,
    cells: Vec<Data>,
}

impl RawRow {
    /// Build a row, padding with empty cells or truncating to `COLUMN_COUNT`.
    pub fn new(index: usize, cells: impl IntoIterator<Item = Data>) -> Self {
        let mut cells: Vec<Data> = cells.into_iter().take(COLUMN_COUNT).collect();
        cells.resize(COLUMN_COUNT, Data::Empty);
        Self { index, cells }
    }

    pub fn cell(&self, col: usize) -> &Data {
        &self.cells[col]
    }

    pub fn cells(&self) -> &[Data] {
        &self.cells
    }
}

//==============================================================================
// Stock Records
//==============================================================================

/// One inventory lot belonging to a party.
///
/// `lot_no` and `product` are never empty in a record produced by the
/// ingestor. Optional text fields are empty strings when the sheet had
/// nothing (or a placeholder such as `-`) in that cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub party_name: String,
    pub s_no: i64,
    pub bank: String,
    pub lot_no: String,
    pub date: Option<NaiveDate>,
    pub mark: String,
    pub lorry: String,
    pub product: String,
    pub packing: Option<f64>,
    pub quantity: Option<i64>,
    pub weight_kgs: Option<f64>,
    pub chamber: String,
    pub floor: String,
    pub bayee: String,
}

//==============================================================================
// Ingestion Summary
//==============================================================================

/// Per-party totals for one ingested batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartySummary {
    pub party_name: String,
    pub records: usize,
    pub quantity: i64,
    pub weight_kgs: f64,
}

/// Aggregate view of an ingested batch, parties in first-appearance order
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct IngestSummary {
    pub record_count: usize,
    pub parties: Vec<PartySummary>,
    pub total_quantity: i64,
    pub total_weight_kgs: f64,
}

impl IngestSummary {
    pub fn from_records(records: &[StockRecord]) -> Self {
        let mut summary = IngestSummary {
            record_count: records.len(),
            ..Default::default()
        };

        for record in records {
            let quantity = record.quantity.unwrap_or(0);
            let weight = record.weight_kgs.unwrap_or(0.0);

            summary.total_quantity = summary.total_quantity.saturating_add(quantity);
            summary.total_weight_kgs += weight;

            match summary
                .parties
                .iter_mut()
                .find(|p| p.party_name == record.party_name)
            {
                Some(party) => {
                    party.records += 1;
                    party.quantity = party.quantity.saturating_add(quantity);
                    party.weight_kgs += weight;
                }
                None => summary.parties.push(PartySummary {
                    party_name: record.party_name.clone(),
                    records: 1,
                    quantity,
                    weight_kgs: weight,
                }),
            }
        }

        summary
    }
}
