//! Tests for the converter with a configured store

use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::*;
use crate::app::adapters::memory_store::MemoryStore;
use crate::app::services::converter::Converter;
use crate::app::storage::Storage;
use crate::error::FormatError;

#[test]
fn test_with_store_assigns_batch_id() {
    let converter = Converter::with_store(MemoryStore::new());

    let first = converter.convert(PEOPLE_CSV.as_bytes(), "people.csv").unwrap();
    let second = converter.convert(PEOPLE_CSV.as_bytes(), "again.csv").unwrap();

    assert_eq!(first.batch_id, Some(BatchId::new(1)));
    assert_eq!(second.batch_id, Some(BatchId::new(2)));
}

#[test]
fn test_stored_records_match_output() {
    let converter = Converter::with_store(MemoryStore::new());
    let conversion = converter.convert(PEOPLE_CSV.as_bytes(), "people.csv").unwrap();

    let batch = converter.get_by_id(conversion.batch_id.unwrap()).unwrap();
    let decoded: Vec<Record> = serde_json::from_slice(&conversion.json).unwrap();

    assert_eq!(batch.name, "people.csv");
    assert_eq!(batch.records, decoded);
    assert_eq!(batch.record_count(), 2);
}

#[test]
fn test_json_is_identical_with_and_without_store() {
    let inputs = [
        PEOPLE_CSV,
        "a,b\n\"x,y\",\"q\"\"r\"\n",
        "only_header",
        "k\n𝄞\n",
    ];

    for input in inputs {
        let plain = Converter::convert_only().convert_reader(input.as_bytes()).unwrap();
        let stored = Converter::with_store(MemoryStore::new())
            .convert_reader(input.as_bytes())
            .unwrap();
        assert_eq!(plain.json, stored.json, "input: {:?}", input);
    }
}

#[test]
fn test_failing_store_fails_conversion() {
    let store = Arc::new(FailingStore::default());
    let converter = Converter::new(Storage::Configured(store.clone()));

    let result = converter.convert(PEOPLE_CSV.as_bytes(), "people.csv");

    assert!(matches!(result, Err(Error::Storage { .. })));
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_store_untouched_on_format_error() {
    let store = Arc::new(FailingStore::default());
    let converter = Converter::new(Storage::Configured(store.clone()));

    let result = converter.convert("a,b\n1".as_bytes(), "bad.csv");

    assert!(matches!(
        result,
        Err(Error::Format(FormatError::ColumnCount(_)))
    ));
    assert_eq!(store.save_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_store_untouched_on_empty_input() {
    let store = Arc::new(RecordingStore::default());
    let converter = Converter::new(Storage::Configured(store.clone()));

    assert!(matches!(
        converter.convert_reader("".as_bytes()),
        Err(Error::EndOfInput)
    ));
    assert!(store.saved.lock().unwrap().is_empty());
}

#[test]
fn test_header_only_saves_empty_batch() {
    let store = Arc::new(RecordingStore::default());
    let converter = Converter::new(Storage::Configured(store.clone()));

    let conversion = converter.convert("a,b\n".as_bytes(), "empty.csv").unwrap();

    assert_eq!(conversion.json_str(), "[]");
    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].1.is_empty());
}

#[test]
fn test_queries_without_store() {
    let converter = Converter::convert_only();

    assert!(matches!(converter.get_all(), Err(Error::StoreNotConfigured)));
    assert!(matches!(
        converter.get_by_id(BatchId::new(1)),
        Err(Error::StoreNotConfigured)
    ));
}

#[test]
fn test_unknown_batch_is_not_found() {
    let converter = Converter::with_store(MemoryStore::new());
    assert!(matches!(
        converter.get_by_id(BatchId::new(42)),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_get_all_in_id_order() {
    let converter = Converter::with_store(MemoryStore::new());
    for name in ["one", "two", "three"] {
        converter.convert(PEOPLE_CSV.as_bytes(), name).unwrap();
    }

    let names: Vec<String> = converter
        .get_all()
        .unwrap()
        .into_iter()
        .map(|batch| batch.name)
        .collect();
    assert_eq!(names, vec!["one", "two", "three"]);
}

#[test]
fn test_concurrent_conversions_get_distinct_ids() {
    let converter = Arc::new(Converter::with_store(MemoryStore::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let converter = Arc::clone(&converter);
            std::thread::spawn(move || {
                converter
                    .convert(PEOPLE_CSV.as_bytes(), &format!("batch-{}", i))
                    .unwrap()
                    .batch_id
                    .unwrap()
            })
        })
        .collect();

    let mut ids: Vec<BatchId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 8);
    assert_eq!(converter.get_all().unwrap().len(), 8);
}
