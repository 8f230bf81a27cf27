//! Ledger persistence boundary
//!
//! The ingestor only produces records; storing them is the job of whatever
//! sits behind [`PartyDirectory`] and [`StockStore`]. [`persist_batch`]
//! encodes the one rule every store must follow: a record whose party has
//! no account is dropped without error.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::types::StockRecord;

/// A client account that stock can be booked against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub party_id: String,
    pub party_name: String,
}

/// A record as stored for an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredStock {
    pub id: Uuid,
    pub party_id: String,
    #[serde(flatten)]
    pub record: StockRecord,
    pub uploaded_on: DateTime<Utc>,
    pub uploaded_by: Option<String>,
}

/// Outcome of persisting one ingested batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PersistSummary {
    pub stored: usize,
    pub dropped: usize,
}

/// Looks up accounts by their exact party name
pub trait PartyDirectory {
    fn find_by_name(&self, party_name: &str) -> Option<Account>;
}

pub trait StockStore {
    /// Commit a whole batch or none of it
    fn insert_batch(&self, stocks: Vec<StoredStock>) -> LedgerResult<()>;

    /// Stored stock for one account, newest upload first
    fn by_party(&self, party_id: &str) -> LedgerResult<Vec<StoredStock>>;
}

/// Store every record that has a matching account; drop the rest.
pub fn persist_batch<D, S>(
    records: Vec<StockRecord>,
    directory: &D,
    store: &S,
    uploaded_by: Option<&str>,
) -> LedgerResult<PersistSummary>
where
    D: PartyDirectory + ?Sized,
    S: StockStore + ?Sized,
{
    let uploaded_on = Utc::now();
    let mut summary = PersistSummary::default();
    let mut batch = Vec::with_capacity(records.len());

    for record in records {
        let Some(account) = directory.find_by_name(&record.party_name) else {
            debug!(party = %record.party_name, lot = %record.lot_no, "no account for party, dropping");
            summary.dropped += 1;
            continue;
        };

        batch.push(StoredStock {
            id: Uuid::new_v4(),
            party_id: account.party_id,
            record,
            uploaded_on,
            uploaded_by: uploaded_by.map(str::to_string),
        });
    }

    summary.stored = batch.len();
    if !batch.is_empty() {
        store.insert_batch(batch)?;
    }

    info!(
        stored = summary.stored,
        dropped = summary.dropped,
        "stock batch persisted"
    );
    Ok(summary)
}

//==============================================================================
// Accounts File
//==============================================================================

/// Accounts file layout:
///
/// ```yaml
/// accounts:
///   - party_id: P001
///     party_name: Acme Traders
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountsFile {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AccountsFile {
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: AccountsFile = serde_yaml::from_str(&content)?;

        let mut seen = HashMap::new();
        for account in &file.accounts {
            if account.party_id.trim().is_empty() || account.party_name.trim().is_empty() {
                return Err(LedgerError::Config(format!(
                    "{}: accounts need both party_id and party_name",
                    path.display()
                )));
            }
            if let Some(previous) = seen.insert(account.party_id.as_str(), &account.party_name) {
                return Err(LedgerError::Config(format!(
                    "{}: duplicate party_id '{}' ({} / {})",
                    path.display(),
                    account.party_id,
                    previous,
                    account.party_name
                )));
            }
        }

        Ok(file)
    }
}

//==============================================================================
// In-Memory Ledger
//==============================================================================

#[derive(Debug, Default)]
struct LedgerInner {
    accounts: Vec<Account>,
    stocks: Vec<StoredStock>,
}

/// Accounts and stored stock held in memory; safe to share across requests.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: RwLock<LedgerInner>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            inner: RwLock::new(LedgerInner {
                accounts,
                stocks: Vec::new(),
            }),
        }
    }

    pub fn account_count(&self) -> usize {
        self.inner.read().map(|inner| inner.accounts.len()).unwrap_or(0)
    }

    pub fn stock_count(&self) -> usize {
        self.inner.read().map(|inner| inner.stocks.len()).unwrap_or(0)
    }
}

impl PartyDirectory for InMemoryLedger {
    fn find_by_name(&self, party_name: &str) -> Option<Account> {
        let inner = self.inner.read().ok()?;
        inner
            .accounts
            .iter()
            .find(|a| a.party_name == party_name)
            .cloned()
    }
}

impl StockStore for InMemoryLedger {
    fn insert_batch(&self, stocks: Vec<StoredStock>) -> LedgerResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| LedgerError::Store("ledger lock poisoned".to_string()))?;
        inner.stocks.extend(stocks);
        Ok(())
    }

    fn by_party(&self, party_id: &str) -> LedgerResult<Vec<StoredStock>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| LedgerError::Store("ledger lock poisoned".to_string()))?;
        // Reverse insertion order, then a stable sort keeps rows of one
        // upload newest-inserted first as well
        let mut stocks: Vec<StoredStock> = inner
            .stocks
            .iter()
            .rev()
            .filter(|s| s.party_id == party_id)
            .cloned()
            .collect();
        stocks.sort_by(|a, b| b.uploaded_on.cmp(&a.uploaded_on));
        Ok(stocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(party: &str, lot: &str) -> StockRecord {
        StockRecord {
            party_name: party.to_string(),
            s_no: 1,
            bank: String::new(),
            lot_no: lot.to_string(),
            date: None,
            mark: String::new(),
            lorry: String::new(),
            product: "Wheat".to_string(),
            packing: None,
            quantity: Some(1),
            weight_kgs: None,
            chamber: String::new(),
            floor: String::new(),
            bayee: String::new(),
        }
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::with_accounts(vec![Account {
            party_id: "P001".to_string(),
            party_name: "Acme Traders".to_string(),
        }])
    }

    #[test]
    fn test_persist_drops_unknown_parties() {
        let ledger = ledger();
        let records = vec![
            record("Acme Traders", "L1"),
            record("Unknown Co", "L2"),
            record("Acme Traders", "L3"),
        ];

        let summary = persist_batch(records, &ledger, &ledger, Some("admin-1")).unwrap();

        assert_eq!(summary, PersistSummary { stored: 2, dropped: 1 });
        let stored = ledger.by_party("P001").unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|s| s.uploaded_by.as_deref() == Some("admin-1")));
    }

    #[test]
    fn test_party_match_is_exact() {
        let ledger = ledger();
        let summary =
            persist_batch(vec![record("ACME TRADERS", "L1")], &ledger, &ledger, None).unwrap();
        assert_eq!(summary.stored, 0);
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn test_by_party_newest_first() {
        let ledger = ledger();
        persist_batch(vec![record("Acme Traders", "OLD")], &ledger, &ledger, None).unwrap();
        persist_batch(vec![record("Acme Traders", "NEW")], &ledger, &ledger, None).unwrap();

        let stored = ledger.by_party("P001").unwrap();
        assert_eq!(stored[0].record.lot_no, "NEW");
        assert_eq!(stored[1].record.lot_no, "OLD");
        assert!(ledger.by_party("P999").unwrap().is_empty());
    }

    #[test]
    fn test_persist_all_dropped_stores_nothing() {
        let ledger = ledger();
        let summary =
            persist_batch(vec![record("Unknown Co", "L1")], &ledger, &ledger, None).unwrap();
        assert_eq!(summary, PersistSummary { stored: 0, dropped: 1 });
        assert_eq!(ledger.stock_count(), 0);
    }

    #[test]
    fn test_accounts_file_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "accounts:\n  - party_id: P001\n    party_name: Acme Traders\n  - party_id: P002\n    party_name: Beta Mills"
        )
        .unwrap();

        let accounts = AccountsFile::load(file.path()).unwrap();
        assert_eq!(accounts.accounts.len(), 2);
        assert_eq!(accounts.accounts[1].party_name, "Beta Mills");
    }

    #[test]
    fn test_accounts_file_rejects_duplicates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "accounts:\n  - party_id: P001\n    party_name: Acme\n  - party_id: P001\n    party_name: Beta"
        )
        .unwrap();

        let err = AccountsFile::load(file.path()).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
        assert!(err.to_string().contains("duplicate party_id 'P001'"));
    }

    #[test]
    fn test_stored_stock_serializes_flat() {
        let stock = StoredStock {
            id: Uuid::new_v4(),
            party_id: "P001".to_string(),
            record: record("Acme Traders", "L1"),
            uploaded_on: Utc::now(),
            uploaded_by: None,
        };
        let json = serde_json::to_value(&stock).unwrap();
        assert_eq!(json["party_id"], "P001");
        assert_eq!(json["lot_no"], "L1");
    }
}
