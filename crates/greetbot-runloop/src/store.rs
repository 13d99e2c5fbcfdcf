//! Session log, screenshot and daily stats storage.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tokio::fs;
use tracing::debug;

use greetbot_protocols::{DailyStats, SessionLog};

use crate::error::StoreError;

/// Persistence for run artifacts.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save (or overwrite) a session.
    async fn save_session(&self, session: &SessionLog) -> Result<(), StoreError>;

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionLog>, StoreError>;

    /// Session IDs, oldest first.
    async fn list_sessions(&self) -> Result<Vec<String>, StoreError>;

    /// Store a base64 PNG for one log entry.
    async fn save_screenshot(
        &self,
        session_id: &str,
        log_id: &str,
        base64_png: &str,
    ) -> Result<(), StoreError>;

    /// Stats for `date`; zeroed when nothing was recorded that day.
    async fn load_daily_stats(&self, date: NaiveDate) -> Result<DailyStats, StoreError>;

    async fn save_daily_stats(&self, stats: &DailyStats) -> Result<(), StoreError>;

    /// Write the plain-text rendering of a session.
    async fn export_text(&self, session: &SessionLog) -> Result<(), StoreError>;
}

/// Plain-text rendering: a header line, the stats, then one line per log.
pub fn render_text(session: &SessionLog) -> String {
    let s = &session.stats;
    let mut out = format!(
        "Session {} started {} status {:?}\nprocessed={} matched={} greeted={} skipped={} errors={}\n",
        session.session_id,
        session.start_time.format("%Y-%m-%d %H:%M:%S"),
        session.status,
        s.processed,
        s.matched,
        s.greeted,
        s.skipped,
        s.errors,
    );
    for log in &session.logs {
        out.push_str(&log.to_text_line());
        out.push('\n');
    }
    out
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<Vec<SessionLog>>,
    screenshots: RwLock<HashMap<(String, String), Vec<u8>>>,
    daily: RwLock<Option<DailyStats>>,
    exports: RwLock<Vec<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screenshot(&self, session_id: &str, log_id: &str) -> Option<Vec<u8>> {
        self.screenshots
            .read()
            .get(&(session_id.to_string(), log_id.to_string()))
            .cloned()
    }

    pub fn exports(&self) -> Vec<String> {
        self.exports.read().clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save_session(&self, session: &SessionLog) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write();
        match sessions.iter_mut().find(|s| s.session_id == session.session_id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionLog>, StoreError> {
        Ok(self
            .sessions
            .read()
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.sessions.read().iter().map(|s| s.session_id.clone()).collect())
    }

    async fn save_screenshot(
        &self,
        session_id: &str,
        log_id: &str,
        base64_png: &str,
    ) -> Result<(), StoreError> {
        let bytes = STANDARD
            .decode(base64_png)
            .map_err(|e| StoreError::Screenshot(e.to_string()))?;
        self.screenshots
            .write()
            .insert((session_id.to_string(), log_id.to_string()), bytes);
        Ok(())
    }

    async fn load_daily_stats(&self, date: NaiveDate) -> Result<DailyStats, StoreError> {
        Ok(self
            .daily
            .read()
            .clone()
            .filter(|s| s.date == date)
            .unwrap_or_else(|| DailyStats::for_date(date)))
    }

    async fn save_daily_stats(&self, stats: &DailyStats) -> Result<(), StoreError> {
        *self.daily.write() = Some(stats.clone());
        Ok(())
    }

    async fn export_text(&self, session: &SessionLog) -> Result<(), StoreError> {
        self.exports.write().push(render_text(session));
        Ok(())
    }
}

/// File system store.
///
/// ```text
/// {data_dir}/
/// ├── daily_stats.json
/// └── sessions/
///     └── {session_id}/
///         ├── session.json
///         ├── session.txt
///         └── screenshots/{log_id}.png
/// ```
pub struct FileSessionStore {
    data_dir: PathBuf,
}

impl FileSessionStore {
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(data_dir.join("sessions")).await?;
        debug!("FileSessionStore initialized at {:?}", data_dir);
        Ok(Self { data_dir })
    }

    fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.sessions_dir().join(sanitize(session_id))
    }

    fn daily_stats_path(&self) -> PathBuf {
        self.data_dir.join("daily_stats.json")
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save_session(&self, session: &SessionLog) -> Result<(), StoreError> {
        let dir = self.session_dir(&session.session_id);
        fs::create_dir_all(&dir).await?;
        let json = serde_json::to_string_pretty(session)?;
        fs::write(dir.join("session.json"), json).await?;
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Option<SessionLog>, StoreError> {
        let path = self.session_dir(session_id).join("session.json");
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn list_sessions(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(self.sessions_dir()).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().join("session.json").exists() {
                ids.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        // IDs embed the start timestamp, so lexical order is chronological.
        ids.sort();
        Ok(ids)
    }

    async fn save_screenshot(
        &self,
        session_id: &str,
        log_id: &str,
        base64_png: &str,
    ) -> Result<(), StoreError> {
        let bytes = STANDARD
            .decode(base64_png)
            .map_err(|e| StoreError::Screenshot(e.to_string()))?;
        let dir = self.session_dir(session_id).join("screenshots");
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(format!("{}.png", sanitize(log_id))), bytes).await?;
        Ok(())
    }

    async fn load_daily_stats(&self, date: NaiveDate) -> Result<DailyStats, StoreError> {
        let path = self.daily_stats_path();
        if !path.exists() {
            return Ok(DailyStats::for_date(date));
        }
        let content = fs::read_to_string(&path).await?;
        let stats: DailyStats = serde_json::from_str(&content)?;
        if stats.date != date {
            return Ok(DailyStats::for_date(date));
        }
        Ok(stats)
    }

    async fn save_daily_stats(&self, stats: &DailyStats) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(stats)?;
        fs::write(self.daily_stats_path(), json).await?;
        Ok(())
    }

    async fn export_text(&self, session: &SessionLog) -> Result<(), StoreError> {
        let dir = self.session_dir(&session.session_id);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join("session.txt"), render_text(session)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
