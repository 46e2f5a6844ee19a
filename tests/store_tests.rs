//! Integration tests for the record store: CRUD, filters, durability

use std::fs;
use tempfile::TempDir;
use worklog_store::{
    NewWorklog, StoreConfig, SyncStatus, WorklogError, WorklogPatch, WorklogStore,
};

fn open_store(temp_dir: &TempDir) -> WorklogStore {
    WorklogStore::open(&StoreConfig::new(temp_dir.path()))
}

fn worklog(date: &str, minutes: u32) -> NewWorklog {
    NewWorklog {
        task_id: "task-42".to_string(),
        external_key: Some("PROJ-42".to_string()),
        date: date.to_string(),
        start_time: "09:00".to_string(),
        end_time: "10:00".to_string(),
        duration_minutes: minutes,
        description: format!("work on {}", date),
    }
}

#[test]
fn test_add_then_list_all_contains_new_pending_record() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);

    let before = store.list_all().unwrap().len();
    let input = worklog("2026-05-04", 45);
    let added = store.add(input.clone()).unwrap();

    let all = store.list_all().unwrap();
    assert_eq!(all.len(), before + 1);

    let found: Vec<_> = all.worklogs.iter().filter(|w| w.id == added.id).collect();
    assert_eq!(found.len(), 1);
    let record = found[0];
    assert_eq!(record.task_id, input.task_id);
    assert_eq!(record.external_key, input.external_key);
    assert_eq!(record.date, input.date);
    assert_eq!(record.start_time, input.start_time);
    assert_eq!(record.end_time, input.end_time);
    assert_eq!(record.duration_minutes, 45);
    assert_eq!(record.description, input.description);
    assert_eq!(record.sync_status, SyncStatus::Pending);
    assert!(record.synced_at.is_none());
    assert!(record.external_worklog_id.is_none());
    assert!(record.error_message.is_none());
    assert_eq!(record.created_at, record.updated_at);
}

#[test]
fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let added = {
        let mut store = open_store(&temp_dir);
        store.add(worklog("2026-05-04", 15)).unwrap()
    };

    let mut reopened = open_store(&temp_dir);
    let all = reopened.list_all().unwrap();
    assert_eq!(all.worklogs, vec![added]);
}

#[test]
fn test_insertion_order_is_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);

    for date in ["2026-05-03", "2026-05-01", "2026-05-02"] {
        store.add(worklog(date, 10)).unwrap();
    }

    let dates: Vec<_> = store
        .list_all()
        .unwrap()
        .worklogs
        .into_iter()
        .map(|w| w.date)
        .collect();
    assert_eq!(dates, vec!["2026-05-03", "2026-05-01", "2026-05-02"]);
}

#[test]
fn test_list_by_date_and_range() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);

    for date in [
        "2026-04-30",
        "2026-05-02",
        "2026-05-01",
        "2026-05-05",
        "2026-05-02",
        "2026-05-06",
    ] {
        store.add(worklog(date, 10)).unwrap();
    }

    assert_eq!(store.list_by_date("2026-05-02").unwrap().len(), 2);
    assert!(store.list_by_date("2026-06-01").unwrap().is_empty());

    let range: Vec<_> = store
        .list_by_range("2026-05-01", "2026-05-05")
        .unwrap()
        .into_iter()
        .map(|w| w.date)
        .collect();
    assert_eq!(
        range,
        vec!["2026-05-02", "2026-05-01", "2026-05-05", "2026-05-02"]
    );
}

#[test]
fn test_list_pending_excludes_synced_and_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);

    let a = store.add(worklog("2026-05-01", 10)).unwrap();
    let b = store.add(worklog("2026-05-01", 10)).unwrap();
    let c = store.add(worklog("2026-05-01", 10)).unwrap();
    store.mark_synced(&a.id, "EXT-1").unwrap();
    store.mark_error(&b.id, "HTTP 401").unwrap();

    let pending = store.list_pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, c.id);
}

#[test]
fn test_update_merges_fields_and_refreshes_updated_at() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    let added = store.add(worklog("2026-05-01", 10)).unwrap();

    let updated = store
        .update(
            &added.id,
            WorklogPatch {
                duration_minutes: Some(25),
                description: Some("pairing".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.id, added.id);
    assert_eq!(updated.duration_minutes, 25);
    assert_eq!(updated.description, "pairing");
    assert_eq!(updated.date, added.date);
    assert_eq!(updated.created_at, added.created_at);
    assert!(updated.updated_at >= added.updated_at);
    assert_eq!(store.list_all().unwrap().worklogs, vec![updated]);
}

#[test]
fn test_update_missing_id_leaves_container_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    store.add(worklog("2026-05-01", 10)).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let result = store.update(
        "does-not-exist",
        WorklogPatch {
            duration_minutes: Some(99),
            ..Default::default()
        },
    );

    assert!(matches!(result, Err(WorklogError::NotFound(_))));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn test_delete_twice() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    let keep = store.add(worklog("2026-05-01", 10)).unwrap();
    let gone = store.add(worklog("2026-05-02", 10)).unwrap();

    store.delete(&gone.id).unwrap();
    let all = store.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all.worklogs[0].id, keep.id);

    assert!(matches!(
        store.delete(&gone.id),
        Err(WorklogError::NotFound(_))
    ));
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn test_mark_synced_from_pending_and_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    let a = store.add(worklog("2026-05-01", 10)).unwrap();
    let b = store.add(worklog("2026-05-01", 10)).unwrap();

    store.mark_error(&b.id, "timeout").unwrap();

    for id in [&a.id, &b.id] {
        let synced = store.mark_synced(id, "EXT-1").unwrap();
        assert_eq!(synced.sync_status, SyncStatus::Synced);
        assert_eq!(synced.external_worklog_id.as_deref(), Some("EXT-1"));
        assert!(synced.error_message.is_none());
        assert!(synced.synced_at.is_some());
    }
}

#[test]
fn test_mark_error_leaves_other_sync_fields() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    let a = store.add(worklog("2026-05-01", 10)).unwrap();

    let failed = store.mark_error(&a.id, "HTTP 400: bad started").unwrap();
    assert_eq!(failed.sync_status, SyncStatus::Error);
    assert_eq!(failed.error_message.as_deref(), Some("HTTP 400: bad started"));
    assert!(failed.synced_at.is_none());
    assert!(failed.external_worklog_id.is_none());
}

#[test]
fn test_synced_record_cannot_be_marked_again() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    let a = store.add(worklog("2026-05-01", 10)).unwrap();
    store.mark_synced(&a.id, "EXT-1").unwrap();

    assert!(matches!(
        store.mark_error(&a.id, "late failure"),
        Err(WorklogError::InvalidTransition { .. })
    ));
    assert!(matches!(
        store.mark_synced(&a.id, "EXT-2"),
        Err(WorklogError::InvalidTransition { .. })
    ));

    let record = store.get(&a.id).unwrap();
    assert_eq!(record.external_worklog_id.as_deref(), Some("EXT-1"));
}

#[test]
fn test_mark_on_missing_id_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    assert!(matches!(
        store.mark_synced("nope", "EXT-1"),
        Err(WorklogError::NotFound(_))
    ));
    assert!(matches!(
        store.mark_error("nope", "x"),
        Err(WorklogError::NotFound(_))
    ));
}

#[test]
fn test_corrupted_file_fails_reads_and_writes() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    fs::write(store.path(), "{\"version\": \"1.0\", \"worklogs\": [").unwrap();

    assert!(matches!(store.list_all(), Err(WorklogError::ReadFailure(_))));
    assert!(matches!(
        store.add(worklog("2026-05-01", 10)),
        Err(WorklogError::ReadFailure(_))
    ));
}

#[test]
fn test_store_works_without_cache() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = WorklogStore::open(&StoreConfig::new(temp_dir.path()).without_cache());

    let a = store.add(worklog("2026-05-01", 10)).unwrap();
    assert_eq!(store.list_all().unwrap().len(), 1);
    store.delete(&a.id).unwrap();
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn test_external_writes_visible_after_ttl() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::new(temp_dir.path()).cache_ttl(std::time::Duration::from_millis(20));
    let mut writer = WorklogStore::open(&config);
    let mut reader = WorklogStore::open(&config);

    assert!(reader.list_all().unwrap().is_empty());
    writer.add(worklog("2026-05-01", 10)).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(40));
    assert_eq!(reader.list_all().unwrap().len(), 1);
}
