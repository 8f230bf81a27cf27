use crate::error::{LedgerError, LedgerResult};
use crate::excel::LedgerExporter;
use crate::ingest;
use crate::ledger::{persist_batch, AccountsFile, InMemoryLedger, PartyDirectory};
use crate::types::{IngestSummary, StockRecord};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Format a weight for display, removing unnecessary decimal places
fn format_weight(n: f64) -> String {
    let rounded = (n * 1e3).round() / 1e3;
    format!("{:.3}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Output format for ingested records, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordFormat {
    Json,
    Yaml,
}

fn record_format(path: &Path) -> LedgerResult<RecordFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("json") => Ok(RecordFormat::Json),
        Some("yaml") | Some("yml") => Ok(RecordFormat::Yaml),
        _ => Err(LedgerError::Validation(format!(
            "Unsupported output format for {} (use .json, .yaml or .yml)",
            path.display()
        ))),
    }
}

fn write_records(records: &[StockRecord], output: &Path) -> LedgerResult<()> {
    let content = match record_format(output)? {
        RecordFormat::Json => serde_json::to_string_pretty(records)?,
        RecordFormat::Yaml => serde_yaml::to_string(records)?,
    };
    fs::write(output, content)?;
    Ok(())
}

fn print_summary(summary: &IngestSummary) {
    println!("{}", "📦 Parties:".bold().cyan());
    for party in &summary.parties {
        println!(
            "   {} - {} lots, qty {}, {} kg",
            party.party_name.bright_blue().bold(),
            party.records,
            party.quantity,
            format_weight(party.weight_kgs)
        );
    }
    println!();
    println!(
        "   Total: {} records, qty {}, {} kg\n",
        summary.record_count.to_string().bold(),
        summary.total_quantity,
        format_weight(summary.total_weight_kgs)
    );
}

/// Execute the ingest command
pub fn ingest(file: PathBuf, output: Option<PathBuf>, verbose: bool) -> LedgerResult<()> {
    println!("{}", "📥 Stockledger - Ingesting stock sheet".bold().green());
    println!("   File: {}\n", file.display());

    // Check the output format before doing any work
    if let Some(ref out) = output {
        record_format(out)?;
    }

    let records = ingest::ingest_path(&file)?;
    let summary = IngestSummary::from_records(&records);

    println!("{}", "✅ Sheet parsed".bold().green());
    print_summary(&summary);

    if verbose {
        for record in &records {
            println!(
                "   {:>4}  {:<18} {:<12} {:<20} qty {}",
                record.s_no,
                record.party_name,
                record.lot_no,
                record.product,
                record
                    .quantity
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
        println!();
    }

    if let Some(out) = output {
        write_records(&records, &out)?;
        println!("{}", "💾 Records written".bold().green());
        println!("   Output: {}\n", out.display());
    }

    Ok(())
}

/// Execute the validate command
pub fn validate(files: Vec<PathBuf>) -> LedgerResult<()> {
    let mut failures = 0;

    for file in &files {
        match ingest::ingest_path(file) {
            Ok(records) => println!(
                "{} {} ({} records)",
                "✅".green(),
                file.display(),
                records.len()
            ),
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "❌".red(), file.display(), e.to_string().red());
            }
        }
    }

    if failures > 0 {
        return Err(LedgerError::Validation(format!(
            "{} of {} file(s) failed validation",
            failures,
            files.len()
        )));
    }

    println!("\n{}", "✅ All stock sheets are valid".bold().green());
    Ok(())
}

/// Execute the export command
pub fn export(input: PathBuf, output: PathBuf, verbose: bool) -> LedgerResult<()> {
    println!("{}", "📤 Stockledger - Ledger Export".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Reading stock sheet...".cyan());
    }

    let records = ingest::ingest_path(&input)?;

    if verbose {
        let summary = IngestSummary::from_records(&records);
        println!(
            "   Found {} records across {} parties\n",
            summary.record_count,
            summary.parties.len()
        );
        println!("{}", "💾 Writing Excel file...".cyan());
    }

    LedgerExporter::new(&records).export(&output)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Excel file: {}\n", output.display());
    Ok(())
}

/// Execute the upload command: ingest, then book records against accounts
pub fn upload(file: PathBuf, accounts: PathBuf, verbose: bool) -> LedgerResult<()> {
    println!("{}", "🗄️  Stockledger - Upload".bold().green());
    println!("   File:     {}", file.display());
    println!("   Accounts: {}\n", accounts.display());

    let accounts = AccountsFile::load(&accounts)?;
    let ledger = InMemoryLedger::with_accounts(accounts.accounts);

    let records = ingest::ingest_path(&file)?;

    if verbose {
        let summary = IngestSummary::from_records(&records);
        print_summary(&summary);
        for party in &summary.parties {
            if ledger.find_by_name(&party.party_name).is_none() {
                println!(
                    "   {} no account for {} ({} lots)",
                    "⚠️".yellow(),
                    party.party_name.yellow(),
                    party.records
                );
            }
        }
        println!();
    }

    let summary = persist_batch(records, &ledger, &ledger, None)?;

    println!("{}", "✅ Upload Complete!".bold().green());
    println!("   Stored:  {}", summary.stored);
    if summary.dropped > 0 {
        println!(
            "   {}",
            format!("Dropped: {} (party has no account)", summary.dropped).yellow()
        );
    } else {
        println!("   Dropped: 0");
    }
    println!();
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
