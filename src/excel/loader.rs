//! Sheet loader - workbook (.xlsx, .xls, .xlsb, .ods) → raw row grid

use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use tracing::debug;

use crate::error::{IngestError, IngestResult};
use crate::types::{RawRow, COLUMN_COUNT};

/// Where the workbook comes from
#[derive(Debug, Clone)]
enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Reads the first sheet of a workbook as untyped rows.
///
/// Cells are passed through exactly as the workbook stores them; nothing is
/// coerced and missing cells stay `Data::Empty`.
pub struct SheetLoader {
    source: Source,
}

impl SheetLoader {
    /// Load from a file on disk; the format is detected from the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source: Source::Path(path.as_ref().to_path_buf()),
        }
    }

    /// Load from an in-memory upload; the format is sniffed from the content
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: Source::Bytes(bytes.into()),
        }
    }

    /// Rows of the first sheet (by position, not by name), indexed by their
    /// absolute sheet position.
    pub fn load(&self) -> IngestResult<Vec<RawRow>> {
        let range = match &self.source {
            Source::Path(path) => {
                let workbook = open_workbook_auto(path)
                    .map_err(|e| IngestError::Load(format!("{}: {}", path.display(), e)))?;
                first_sheet(workbook)?
            }
            Source::Bytes(bytes) => {
                let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.as_slice()))
                    .map_err(|e| IngestError::Load(e.to_string()))?;
                first_sheet(workbook)?
            }
        };

        let rows = range_to_rows(&range);
        debug!(rows = rows.len(), "loaded first sheet");
        Ok(rows)
    }
}

fn first_sheet<RS>(mut workbook: Sheets<RS>) -> IngestResult<Range<Data>>
where
    RS: std::io::Read + std::io::Seek,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::Load("Workbook has no sheets".to_string()))?
        .map_err(|e| IngestError::Load(format!("Failed to read first sheet: {}", e)))
}

/// Expand a used range into full rows starting at sheet row 0, column 0.
///
/// calamine trims leading empty rows and columns from the range; positions
/// are restored so column 0 is always column A and `RawRow::index` is the
/// real sheet row.
fn range_to_rows(range: &Range<Data>) -> Vec<RawRow> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<RawRow> = (0..start_row)
        .map(|index| RawRow::new(index, std::iter::empty()))
        .collect();

    for (offset, cells) in range.rows().enumerate() {
        let leading = std::iter::repeat(Data::Empty).take(start_col.min(COLUMN_COUNT));
        let row = RawRow::new(start_row + offset, leading.chain(cells.iter().cloned()));
        rows.push(row);
    }

    rows
}
