//! Persistence boundary tests
//!
//! `persist_batch` only sees the two traits, so any directory/store pair
//! must get the same drop rule.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use stockledger::error::{LedgerError, LedgerResult};
use stockledger::ledger::{
    persist_batch, Account, AccountsFile, InMemoryLedger, PartyDirectory, PersistSummary,
    StockStore, StoredStock,
};
use stockledger::StockRecord;
use tempfile::TempDir;

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
        quantity: None,
        weight_kgs: None,
        chamber: String::new(),
        floor: String::new(),
        bayee: String::new(),
    }
}

/// Directory backed by a plain map of party name → id
struct MapDirectory(HashMap<String, String>);

impl PartyDirectory for MapDirectory {
    fn find_by_name(&self, party_name: &str) -> Option<Account> {
        self.0.get(party_name).map(|id| Account {
            party_id: id.clone(),
            party_name: party_name.to_string(),
        })
    }
}

/// Transactional store: rows are staged and only committed when every row
/// of the batch is accepted. `fail_on` rejects the n-th row (1-based).
#[derive(Default)]
struct RecordingStore {
    stocks: RefCell<Vec<StoredStock>>,
    batches: Cell<usize>,
    fail_on: Option<usize>,
}

impl StockStore for RecordingStore {
    fn insert_batch(&self, stocks: Vec<StoredStock>) -> LedgerResult<()> {
        self.batches.set(self.batches.get() + 1);
        let mut staged = Vec::with_capacity(stocks.len());
        for (n, stock) in stocks.into_iter().enumerate() {
            if self.fail_on == Some(n + 1) {
                return Err(LedgerError::Store("database unavailable".to_string()));
            }
            staged.push(stock);
        }
        self.stocks.borrow_mut().extend(staged);
        Ok(())
    }

    fn by_party(&self, party_id: &str) -> LedgerResult<Vec<StoredStock>> {
        Ok(self
            .stocks
            .borrow()
            .iter()
            .filter(|s| s.party_id == party_id)
            .cloned()
            .collect())
    }
}

fn directory() -> MapDirectory {
    MapDirectory(HashMap::from([
        ("Acme Traders".to_string(), "P001".to_string()),
        ("Globex".to_string(), "P002".to_string()),
    ]))
}

// ═══════════════════════════════════════════════════════════════════════════
// PERSIST BATCH
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_persist_through_custom_traits() {
    let store = RecordingStore::default();
    let records = vec![
        record("Acme Traders", "L1"),
        record("Nobody", "L2"),
        record("Globex", "L3"),
    ];

    let summary = persist_batch(records, &directory(), &store, Some("clerk")).unwrap();

    assert_eq!(summary, PersistSummary { stored: 2, dropped: 1 });
    let stocks = store.stocks.borrow();
    assert_eq!(stocks[0].party_id, "P001");
    assert_eq!(stocks[1].party_id, "P002");
    assert_eq!(stocks[1].record.lot_no, "L3");
    assert_ne!(stocks[0].id, stocks[1].id);
    assert_eq!(stocks[0].uploaded_on, stocks[1].uploaded_on);
    assert_eq!(store.batches.get(), 1);
}

#[test]
fn test_persist_all_unknown_is_not_an_error() {
    let store = RecordingStore::default();
    let summary = persist_batch(
        vec![record("Nobody", "L1"), record("Also Nobody", "L2")],
        &directory(),
        &store,
        None,
    )
    .unwrap();

    assert_eq!(summary, PersistSummary { stored: 0, dropped: 2 });
    assert!(store.stocks.borrow().is_empty());
    assert_eq!(store.batches.get(), 0);
}

#[test]
fn test_store_failure_propagates() {
    let store = RecordingStore {
        fail_on: Some(1),
        ..Default::default()
    };

    let result = persist_batch(vec![record("Acme Traders", "L1")], &directory(), &store, None);

    assert!(matches!(result, Err(LedgerError::Store(_))));
}

#[test]
fn test_failure_mid_batch_leaves_nothing_stored() {
    let store = RecordingStore {
        fail_on: Some(2),
        ..Default::default()
    };
    let records = vec![
        record("Acme Traders", "L1"),
        record("Acme Traders", "L2"),
        record("Globex", "L3"),
    ];

    let result = persist_batch(records, &directory(), &store, None);

    assert!(matches!(result, Err(LedgerError::Store(_))));
    assert!(store.stocks.borrow().is_empty());
    assert!(store.by_party("P001").unwrap().is_empty());
}

#[test]
fn test_in_memory_batch_is_committed_whole() {
    let ledger = InMemoryLedger::with_accounts(vec![Account {
        party_id: "P001".to_string(),
        party_name: "Acme Traders".to_string(),
    }]);
    let records = vec![
        record("Acme Traders", "L1"),
        record("Acme Traders", "L2"),
        record("Acme Traders", "L3"),
    ];

    let summary = persist_batch(records, &ledger, &ledger, None).unwrap();

    assert_eq!(summary.stored, 3);
    let stocks = ledger.by_party("P001").unwrap();
    assert_eq!(stocks.len(), 3);
    assert!(stocks.iter().all(|s| s.uploaded_on == stocks[0].uploaded_on));
}

#[test]
fn test_persist_accepts_trait_objects() {
    let ledger = InMemoryLedger::with_accounts(vec![Account {
        party_id: "P001".to_string(),
        party_name: "Acme Traders".to_string(),
    }]);
    let dir: &dyn PartyDirectory = &ledger;
    let store: &dyn StockStore = &ledger;

    let summary = persist_batch(vec![record("Acme Traders", "L1")], dir, store, None).unwrap();

    assert_eq!(summary.stored, 1);
    assert_eq!(ledger.stock_count(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// ACCOUNTS FILE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_accounts_file_into_ledger() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.yaml");
    std::fs::write(
        &path,
        "accounts:\n  - party_id: P001\n    party_name: Acme Traders\n  - party_id: P002\n    party_name: Globex\n",
    )
    .unwrap();

    let accounts = AccountsFile::load(&path).unwrap();
    let ledger = InMemoryLedger::with_accounts(accounts.accounts);

    assert_eq!(ledger.account_count(), 2);
    assert_eq!(ledger.find_by_name("Globex").unwrap().party_id, "P002");
}

#[test]
fn test_accounts_file_blank_name_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.yaml");
    std::fs::write(&path, "accounts:\n  - party_id: P001\n    party_name: \"  \"\n").unwrap();

    assert!(matches!(
        AccountsFile::load(&path),
        Err(LedgerError::Config(_))
    ));
}

#[test]
fn test_accounts_file_bad_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.yaml");
    std::fs::write(&path, "accounts: [unclosed").unwrap();

    assert!(matches!(AccountsFile::load(&path), Err(LedgerError::Yaml(_))));
}
