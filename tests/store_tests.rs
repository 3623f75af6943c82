use std::sync::Arc;

use attendance::model::student::NewStudent;
use attendance::store::{MemoryStore, RecordStore, StoreError};
use attendance::utils::roll_index::normalize;

fn new_student(roll: &str, name: &str) -> NewStudent {
    NewStudent {
        roll_number: roll.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "555".to_string(),
    }
}

#[test]
fn create_assigns_monotonic_ids_and_keeps_creation_order() {
    let store = MemoryStore::new();
    let a = store.create(new_student("1", "Asha")).unwrap();
    let b = store.create(new_student("2", "Borhan")).unwrap();
    let c = store.create(new_student("3", "Chitra")).unwrap();

    assert!(a.id < b.id && b.id < c.id);
    assert_eq!(a.version, 0);
    assert!(a.checkin_time.is_none() && a.checkout_time.is_none());

    let listed: Vec<u64> = store.list_all().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(listed, vec![a.id, b.id, c.id]);
}

#[test]
fn duplicate_roll_is_rejected_on_normalized_form() {
    let store = MemoryStore::new();
    store.create(new_student("42", "Asha")).unwrap();

    let err = store.create(new_student(" 42 ", "Borhan")).unwrap_err();
    assert_eq!(err, StoreError::DuplicateKey);
}

#[test]
fn get_by_roll_resolves_through_secondary_index() {
    let store = MemoryStore::new();
    let created = store.create(new_student("R-7", "Asha")).unwrap();

    let found = store.get_by_roll(&normalize("r-7")).unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.roll_number, "R-7");

    assert_eq!(
        store.get_by_roll(&normalize("missing")).unwrap_err(),
        StoreError::NotFound
    );
}

#[test]
fn update_checks_version_and_bumps_it() {
    let store = MemoryStore::new();
    let mut rec = store.create(new_student("1", "Asha")).unwrap();

    rec.checkin_time = Some(chrono::Utc::now());
    let updated = store.update(&rec).unwrap();
    assert_eq!(updated.version, rec.version + 1);

    // Writing back the stale snapshot must conflict.
    let err = store.update(&rec).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { stored: 1, supplied: 0 }));
}

#[test]
fn update_keeps_id_and_roll_immutable() {
    let store = MemoryStore::new();
    let mut rec = store.create(new_student("1", "Asha")).unwrap();

    rec.roll_number = "999".to_string();
    rec.name = "Asha R.".to_string();
    let updated = store.update(&rec).unwrap();

    assert_eq!(updated.roll_number, "1");
    assert_eq!(updated.name, "Asha R.");
    assert!(store.get_by_roll(&normalize("1")).is_ok());
}

#[test]
fn update_unknown_id_is_not_found() {
    let store = MemoryStore::new();
    let mut rec = store.create(new_student("1", "Asha")).unwrap();
    rec.id = 777;
    assert_eq!(store.update(&rec).unwrap_err(), StoreError::NotFound);
}

#[test]
fn list_all_is_idempotent_without_writes() {
    let store = MemoryStore::new();
    for i in 0..5 {
        store
            .create(new_student(&i.to_string(), &format!("S{}", i)))
            .unwrap();
    }

    let first = store.list_all().unwrap();
    let second = store.list_all().unwrap();
    let ids = |v: &[attendance::StudentRecord]| v.iter().map(|r| r.id).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(
        first.iter().map(|r| &r.roll_number).collect::<Vec<_>>(),
        second.iter().map(|r| &r.roll_number).collect::<Vec<_>>()
    );
}

#[test]
fn parallel_creates_on_distinct_rolls_all_land() {
    let store = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.create(new_student(&format!("roll-{}", i), "S")))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let records = store.list_all().unwrap();
    assert_eq!(records.len(), 16);

    let mut ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 16, "ids must be unique");
}

#[test]
fn parallel_stale_writes_admit_exactly_one_winner_per_version() {
    let store = Arc::new(MemoryStore::new());
    let rec = store.create(new_student("1", "Asha")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let mut snapshot = rec.clone();
            std::thread::spawn(move || {
                snapshot.checkin_time = Some(chrono::Utc::now());
                store.update(&snapshot)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "same-version writers race to exactly one winner");
    assert!(
        outcomes
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(StoreError::Conflict { .. })))
    );
}
