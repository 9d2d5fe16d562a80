use std::{collections::HashMap, fs};

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use tempfile::tempdir;

use checkbatch_core::{BatchCommit, CoreError, LedgerRepository};
use checkbatch_domain::{Ledger, Profile, TransactionKind, TransactionRecord};
use checkbatch_storage_json::JsonBookStore;

fn seeded_store(root: std::path::PathBuf) -> (JsonBookStore, Profile, Ledger) {
    let store = JsonBookStore::open(root).expect("open store");
    let profile = Profile::new("Main").with_next_check_number(1001);
    let ledger = Ledger::new("Operating", dec!(1000));
    store
        .initialize(profile.clone(), ledger.clone())
        .expect("initialize");
    (store, profile, ledger)
}

fn check(ledger: &Ledger, profile: &Profile, amount: rust_decimal::Decimal) -> TransactionRecord {
    TransactionRecord::new(
        TransactionKind::Check,
        ledger.id,
        profile.id,
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        "Acme",
        amount,
        dec!(1000),
        Utc::now(),
    )
    .with_check_number(Some(1001))
}

#[test]
fn book_survives_a_reopen() {
    let dir = tempdir().expect("tempdir");
    let (store, profile, ledger) = seeded_store(dir.path().to_path_buf());
    assert!(store.is_initialized().unwrap());
    assert!(store.book_path().exists());
    drop(store);

    let reopened = JsonBookStore::open(dir.path().to_path_buf()).expect("reopen");
    let book = reopened.snapshot().unwrap();
    assert_eq!(book.active_profile_id, Some(profile.id));
    assert_eq!(book.ledger(ledger.id).unwrap().starting_balance, dec!(1000));
    assert!(reopened.find_ledger_by_name("OPERATING").unwrap().is_some());
}

#[test]
fn commit_batch_persists_records_ledgers_and_counter() {
    let dir = tempdir().expect("tempdir");
    let (store, profile, ledger) = seeded_store(dir.path().to_path_buf());
    let ops = Ledger::provisioned("Ops");

    let mut balances = HashMap::new();
    balances.insert(ledger.id, dec!(900));
    balances.insert(ops.id, dec!(0));
    store
        .commit_batch(BatchCommit {
            new_ledgers: vec![ops.clone()],
            balances,
            records: vec![check(&ledger, &profile, dec!(100))],
            profile_id: profile.id,
            next_check_number: 1002,
        })
        .expect("commit");

    let reopened = JsonBookStore::open(dir.path().to_path_buf()).expect("reopen");
    let book = reopened.snapshot().unwrap();
    assert_eq!(book.records.len(), 1);
    assert!(book.ledger(ops.id).is_some());
    assert_eq!(book.profile(profile.id).unwrap().next_check_number, 1002);
    assert_eq!(book.ledger(ledger.id).unwrap().balance_cache, Some(dec!(900)));
    assert_eq!(reopened.current_balance(ledger.id).unwrap(), dec!(900));
}

#[test]
fn failed_commit_leaves_the_book_untouched() {
    let dir = tempdir().expect("tempdir");
    let (store, profile, ledger) = seeded_store(dir.path().to_path_buf());

    let result = store.commit_batch(BatchCommit {
        records: vec![check(&ledger, &profile, dec!(100))],
        profile_id: uuid::Uuid::new_v4(),
        next_check_number: 5,
        ..BatchCommit::default()
    });
    assert!(matches!(result, Err(CoreError::ProfileNotFound(_))));
    assert!(store.snapshot().unwrap().records.is_empty());
}

#[test]
fn saves_keep_a_bounded_number_of_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBookStore::with_retention(dir.path().to_path_buf(), 2).expect("open store");
    store
        .initialize(Profile::new("Main"), Ledger::new("Operating", dec!(0)))
        .unwrap();
    for round in 0..4 {
        store
            .update(|book| {
                book.ledgers[0].starting_balance = rust_decimal::Decimal::from(round);
                Ok(())
            })
            .unwrap();
    }
    let backups = store.list_backups().unwrap();
    assert!(!backups.is_empty());
    assert!(backups.len() <= 2);
    assert!(backups.iter().all(|b| b.name.starts_with("book_")));
}

#[test]
fn manual_backup_can_be_restored() {
    let dir = tempdir().expect("tempdir");
    let (store, _, ledger) = seeded_store(dir.path().to_path_buf());
    let info = store.backup(Some("Before Q3 run")).expect("backup");
    assert!(info.name.ends_with("_before-q3-run.json"));

    store
        .update(|book| {
            book.ledger_mut(ledger.id).unwrap().starting_balance = dec!(5);
            Ok(())
        })
        .unwrap();

    let restored = store.restore(&info.name).expect("restore");
    assert_eq!(restored.ledger(ledger.id).unwrap().starting_balance, dec!(1000));
    assert!(matches!(
        store.restore("book_missing.json"),
        Err(CoreError::Storage(_))
    ));
}

#[test]
fn restore_refuses_names_outside_the_backups_folder() {
    let dir = tempdir().expect("tempdir");
    let (store, _, ledger) = seeded_store(dir.path().join("book"));
    let stray = store.snapshot().unwrap();
    fs::write(
        dir.path().join("book_stray.json"),
        serde_json::to_string(&stray).unwrap(),
    )
    .unwrap();

    for name in ["../book.json", "../../book_stray.json", "book.json", "/etc/passwd"] {
        assert!(matches!(store.restore(name), Err(CoreError::Storage(_))));
    }
    assert_eq!(
        store.snapshot().unwrap().ledger(ledger.id).unwrap().starting_balance,
        dec!(1000)
    );
}

#[test]
fn newer_schema_versions_are_rejected() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("book.json"),
        r#"{ "schema_version": 99, "ledgers": [], "records": [], "profiles": [] }"#,
    )
    .unwrap();

    let result = JsonBookStore::open(dir.path().to_path_buf());
    assert!(matches!(result, Err(CoreError::Storage(message)) if message.contains("99")));
}
