use super::*;
use greetbot_protocols::{CandidateInfo, LogAction, MatchResult, OperationLog, RunStatus};
use tempfile::TempDir;

fn sample_session() -> SessionLog {
    let mut session = SessionLog::start();
    let candidate = CandidateInfo::new(0, "张三", "28岁 | 3年 | 硕士");
    session.push(OperationLog::new(
        &candidate,
        &MatchResult::new(true, 0.9, "技能匹配", vec!["Rust".to_string()]),
        LogAction::Greeted,
    ));
    session.push(OperationLog::error(&candidate, "region has zero area (0x500)"));
    session.finish(RunStatus::Completed);
    session
}

#[tokio::test]
async fn test_file_store_session_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    let session = sample_session();

    store.save_session(&session).await.unwrap();
    let loaded = store.load_session(&session.session_id).await.unwrap().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(store.list_sessions().await.unwrap(), vec![session.session_id.clone()]);
    assert!(store.load_session("session_missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_screenshot_written_as_png() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    let png = [0x89u8, b'P', b'N', b'G', 1, 2, 3];

    store
        .save_screenshot("session_1", "log-1", &STANDARD.encode(png))
        .await
        .unwrap();

    let path = store.session_dir("session_1").join("screenshots").join("log-1.png");
    assert_eq!(std::fs::read(path).unwrap(), png);

    let err = store.save_screenshot("session_1", "log-2", "not base64!").await;
    assert!(matches!(err, Err(StoreError::Screenshot(_))));
}

#[tokio::test]
async fn test_file_store_daily_stats_reset_on_new_day() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2026, 10, 13).unwrap();

    assert_eq!(store.load_daily_stats(monday).await.unwrap(), DailyStats::for_date(monday));

    let mut stats = DailyStats::for_date(monday);
    stats.total_processed = 12;
    stats.total_greeted = 4;
    store.save_daily_stats(&stats).await.unwrap();

    assert_eq!(store.load_daily_stats(monday).await.unwrap(), stats);
    assert_eq!(store.load_daily_stats(tuesday).await.unwrap(), DailyStats::for_date(tuesday));
}

#[tokio::test]
async fn test_file_store_text_export() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path()).await.unwrap();
    let session = sample_session();

    store.export_text(&session).await.unwrap();
    let text = std::fs::read_to_string(store.session_dir(&session.session_id).join("session.txt")).unwrap();
    assert!(text.contains("processed=2 matched=1 greeted=1 skipped=0 errors=1"));
    assert!(text.contains("张三 | greeted | match=true (90%) | 技能匹配"));
    assert!(text.contains("error: region has zero area"));
}

#[tokio::test]
async fn test_memory_store_overwrites_session() {
    let store = MemorySessionStore::new();
    let mut session = SessionLog::start();
    store.save_session(&session).await.unwrap();
    session.finish(RunStatus::Stopped);
    store.save_session(&session).await.unwrap();

    assert_eq!(store.list_sessions().await.unwrap().len(), 1);
    let loaded = store.load_session(&session.session_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, RunStatus::Stopped);
}

#[test]
fn test_sanitize_session_id() {
    assert_eq!(sanitize("session_20261018_101500"), "session_20261018_101500");
    assert_eq!(sanitize("../etc/passwd"), "___etc_passwd");
}
