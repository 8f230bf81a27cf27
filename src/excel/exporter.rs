//! Ledger exporter - stock records → party-grouped .xlsx
//!
//! The layout mirrors the sheets people upload, so an exported ledger can be
//! ingested again: party header, "S NO" heading row, data rows, then a
//! "PARTY TOTAL" row per party.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::LedgerResult;
use crate::types::{col, StockRecord, COLUMN_HEADINGS};

const SHEET_NAME: &str = "Stock";
const DATE_FORMAT: &str = "%d-%m-%Y";

/// Writes a batch of stock records as a normalized stock sheet
pub struct LedgerExporter<'a> {
    records: &'a [StockRecord],
}

impl<'a> LedgerExporter<'a> {
    pub fn new(records: &'a [StockRecord]) -> Self {
        Self { records }
    }

    /// Export to an .xlsx file on disk
    pub fn export(&self, output_path: &Path) -> LedgerResult<()> {
        let mut workbook = self.build()?;
        workbook.save(output_path)?;
        Ok(())
    }

    /// Export to an in-memory .xlsx buffer
    pub fn to_buffer(&self) -> LedgerResult<Vec<u8>> {
        let mut workbook = self.build()?;
        Ok(workbook.save_to_buffer()?)
    }

    fn build(&self) -> LedgerResult<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        self.write_sheet(worksheet)?;
        Ok(workbook)
    }

    fn write_sheet(&self, worksheet: &mut Worksheet) -> LedgerResult<()> {
        let bold = Format::new().set_bold();
        let mut row: u32 = 0;

        // Consecutive records with the same party form one group
        for group in self
            .records
            .chunk_by(|a, b| a.party_name == b.party_name)
        {
            worksheet.write_string_with_format(row, 0, &group[0].party_name, &bold)?;
            row += 1;

            for (idx, heading) in COLUMN_HEADINGS.iter().enumerate() {
                worksheet.write_string_with_format(row, idx as u16, *heading, &bold)?;
            }
            row += 1;

            for record in group {
                write_record(worksheet, row, record)?;
                row += 1;
            }

            let quantity = group
                .iter()
                .filter_map(|r| r.quantity)
                .fold(0i64, i64::saturating_add);
            let weight: f64 = group.iter().filter_map(|r| r.weight_kgs).sum();
            worksheet.write_string_with_format(row, 0, "PARTY TOTAL", &bold)?;
            worksheet.write_number_with_format(row, col::QUANTITY as u16, quantity as f64, &bold)?;
            worksheet.write_number_with_format(row, col::WEIGHT_KGS as u16, weight, &bold)?;
            // blank separator row between parties
            row += 2;
        }

        Ok(())
    }
}

fn write_record(worksheet: &mut Worksheet, row: u32, record: &StockRecord) -> LedgerResult<()> {
    worksheet.write_number(row, col::S_NO as u16, record.s_no as f64)?;

    let text_cells = [
        (col::BANK, &record.bank),
        (col::LOT_NO, &record.lot_no),
        (col::MARK, &record.mark),
        (col::LORRY, &record.lorry),
        (col::PRODUCT, &record.product),
        (col::CHAMBER, &record.chamber),
        (col::FLOOR, &record.floor),
        (col::BAYEE, &record.bayee),
    ];
    for (column, value) in text_cells {
        if !value.is_empty() {
            worksheet.write_string(row, column as u16, value.as_str())?;
        }
    }

    if let Some(date) = record.date {
        worksheet.write_string(row, col::DATE as u16, date.format(DATE_FORMAT).to_string())?;
    }

    let number_cells = [
        (col::PACKING, record.packing),
        (col::QUANTITY, record.quantity.map(|q| q as f64)),
        (col::WEIGHT_KGS, record.weight_kgs),
    ];
    for (column, value) in number_cells {
        if let Some(value) = value {
            worksheet.write_number(row, column as u16, value)?;
        }
    }

    Ok(())
}
