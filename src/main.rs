use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stockledger::cli;
use stockledger::error::LedgerResult;

#[derive(Parser)]
#[command(name = "stockledger")]
#[command(about = "Ingest party-grouped stock sheets into a clean inventory ledger.")]
#[command(long_about = "Stockledger - stock sheet ingestion for the inventory dashboard

Reads the first sheet of an Excel workbook laid out as party groups:
a party name row, a column heading row, numbered stock rows and a
PARTY TOTAL row. Every numbered row becomes one stock record for the
party above it. Any structural problem rejects the whole sheet.

COMMANDS:
  ingest    - Parse a stock sheet and print a per-party summary
  validate  - Check one or more stock sheets without writing anything
  export    - Re-emit a stock sheet as a normalized workbook
  upload    - Book a stock sheet against an accounts file

EXAMPLES:
  stockledger ingest stock.xlsx                   # Summary only
  stockledger ingest stock.xlsx -o records.json   # Write records
  stockledger validate jan.xlsx feb.xlsx
  stockledger upload stock.xlsx --accounts accounts.yaml")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Parse a stock sheet into stock records.

SHEET LAYOUT (first sheet, 13 columns):
  S NO | BANK | LOT NO | DATE | MARK | LORRY | PRODUCT |
  PACKING | QTY | WEIGHT (KGS) | CHAMBER | FLOOR | BAYEE

ROWS:
  Party name alone in column A   → starts a party group
  S NO / PARTY TOTAL / blank     → ignored
  Number in column A             → one stock record
  Anything else                  → skipped

Dates are read day-first (01-02-2024 is 1 February 2024).
Blank, '-', 'N/A' and 'NA' cells are treated as empty.

OUTPUT:
  -o records.json   JSON array of records
  -o records.yaml   YAML sequence of records")]
    /// Parse a stock sheet into stock records
    Ingest {
        /// Path to Excel file (.xlsx, .xls, .xlsb, .ods)
        file: PathBuf,

        /// Write records to this file (.json, .yaml or .yml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every record
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Validate stock sheets without writing anything.

A sheet is valid when every numbered row sits under a party name,
every record has a LOT NO and a PRODUCT, and at least one record
is found.

BATCH VALIDATION:
  stockledger validate jan.xlsx feb.xlsx mar.xlsx
  Validates every file, reporting all failures, and exits non-zero
  if any file fails.")]
    /// Validate stock sheets
    Validate {
        /// Path to Excel file(s) to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    #[command(long_about = "Export a stock sheet as a normalized workbook.

Party names are title-cased, placeholders removed, dates written as
DD-MM-YYYY and each party closed with a PARTY TOTAL row. The output
can be ingested again and yields the same records.

EXAMPLE:
  stockledger export raw_stock.xlsx clean_stock.xlsx")]
    /// Export a stock sheet as a normalized .xlsx
    Export {
        /// Path to the stock sheet
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Book a stock sheet against client accounts.

Records are matched to accounts by exact party name. Records whose
party has no account are dropped and counted, not rejected.

ACCOUNTS FILE (YAML):
  accounts:
    - party_id: P001
      party_name: Acme Traders

EXAMPLE:
  stockledger upload stock.xlsx --accounts accounts.yaml")]
    /// Book a stock sheet against an accounts file
    Upload {
        /// Path to the stock sheet
        file: PathBuf,

        /// Accounts file (YAML)
        #[arg(short, long, env = "STOCKLEDGER_ACCOUNTS")]
        accounts: PathBuf,

        /// Show per-party details
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> LedgerResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            file,
            output,
            verbose,
        } => cli::ingest(file, output, verbose),

        Commands::Validate { files } => cli::validate(files),

        Commands::Export {
            input,
            output,
            verbose,
        } => cli::export(input, output, verbose),

        Commands::Upload {
            file,
            accounts,
            verbose,
        } => cli::upload(file, accounts, verbose),
    }
}
