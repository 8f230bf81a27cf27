//! Excel workbook I/O for stock sheets
//!
//! - Load: any workbook calamine understands → raw rows of the first sheet
//! - Export: stock records → normalized party-grouped .xlsx

mod exporter;
mod loader;

pub use exporter::LedgerExporter;
pub use loader::SheetLoader;
