use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use dracin_model::ScanLogFrame;
use tracing::warn;

use crate::storage::{KeyValueStore, SCAN_LOG_KEY, load_json, save_json};

const TIME_FORMAT: &str = "%H:%M:%S";

/// `HH:MM:SS message`, used for lines the client writes itself.
pub fn format_plain(at: DateTime<Local>, message: &str) -> String {
    format!("{} {message}", at.format(TIME_FORMAT))
}

/// `[HH:MM:SS] [LEVEL] message` for a pushed `log` frame. The frame's own
/// timestamp wins over `now` when it parses.
pub fn format_frame(frame: &ScanLogFrame, now: DateTime<Local>) -> String {
    let at = frame
        .timestamp
        .as_ref()
        .and_then(|ts| ts.to_local())
        .unwrap_or(now);
    let level = frame
        .level
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| "INFO".to_string());
    let message = frame.message.as_deref().unwrap_or_default();
    format!("[{}] [{level}] {message}", at.format(TIME_FORMAT))
}

/// Bounded scan log. The newest `persisted` lines are mirrored to storage
/// after every append so the next session can show recent context.
#[derive(Debug)]
pub struct ScanLog {
    lines: VecDeque<String>,
    capacity: usize,
    persisted: usize,
    store: Arc<dyn KeyValueStore>,
}

impl ScanLog {
    /// Empty log seeded with whatever tail the previous session left.
    pub fn new(
        capacity: usize,
        persisted: usize,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let capacity = capacity.max(1);
        let persisted = persisted.min(capacity);
        let mut log = Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            persisted,
            store,
        };
        log.restore();
        log
    }

    fn restore(&mut self) {
        let saved: Vec<String> =
            match load_json(self.store.as_ref(), SCAN_LOG_KEY) {
                Ok(saved) => saved.unwrap_or_default(),
                Err(err) => {
                    warn!(error = %err, "ignoring unreadable scan log tail");
                    return;
                }
            };
        let skip = saved.len().saturating_sub(self.persisted);
        self.lines.extend(saved.into_iter().skip(skip));
    }

    /// Timestamp and append a plain message. Returns the formatted line.
    pub fn append(&mut self, message: &str) -> String {
        self.push(format_plain(Local::now(), message))
    }

    /// Format and append a stream log frame. Returns the formatted line.
    pub fn append_frame(&mut self, frame: &ScanLogFrame) -> String {
        self.push(format_frame(frame, Local::now()))
    }

    /// Add an already formatted line.
    pub fn push(&mut self, line: String) -> String {
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.clone());
        self.persist();
        line
    }

    /// Drop every line, including the persisted tail.
    pub fn clear(&mut self) {
        self.lines.clear();
        if let Err(err) = self.store.remove(SCAN_LOG_KEY) {
            warn!(error = %err, "failed to clear persisted scan log");
        }
    }

    /// Oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Most recent line.
    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no line is held.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines kept before the oldest is dropped.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn persist(&self) {
        let skip = self.lines.len().saturating_sub(self.persisted);
        let tail: Vec<&str> = self.lines.iter().skip(skip).map(String::as_str).collect();
        if let Err(err) = save_json(self.store.as_ref(), SCAN_LOG_KEY, &tail) {
            warn!(error = %err, "failed to persist scan log tail");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use dracin_model::LogTimestamp;

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn plain_and_frame_formats() {
        assert_eq!(format_plain(at(9, 5, 7), "Scan dimulai"), "09:05:07 Scan dimulai");

        let frame = ScanLogFrame {
            timestamp: None,
            level: Some("warn".into()),
            message: Some("lambat".into()),
        };
        assert_eq!(format_frame(&frame, at(23, 0, 1)), "[23:00:01] [WARN] lambat");

        let bare = ScanLogFrame::default();
        assert_eq!(format_frame(&bare, at(1, 2, 3)), "[01:02:03] [INFO] ");
    }

    #[test]
    fn frame_timestamp_takes_precedence() {
        let stamp = at(12, 34, 56);
        let frame = ScanLogFrame {
            timestamp: Some(LogTimestamp::Millis(stamp.timestamp_millis())),
            level: Some("error".into()),
            message: Some("gagal".into()),
        };
        assert_eq!(format_frame(&frame, at(0, 0, 0)), "[12:34:56] [ERROR] gagal");

        let garbage = ScanLogFrame {
            timestamp: Some(LogTimestamp::Text("kemarin".into())),
            ..frame
        };
        assert_eq!(format_frame(&garbage, at(7, 7, 7)), "[07:07:07] [ERROR] gagal");
    }

    #[test]
    fn memory_and_persisted_caps() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut log = ScanLog::new(300, 2, Arc::clone(&store));
        for i in 0..350 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), 300);
        assert_eq!(log.lines().next(), Some("line 50"));
        assert_eq!(log.last(), Some("line 349"));

        let saved: Vec<String> = load_json(store.as_ref(), SCAN_LOG_KEY).unwrap().unwrap();
        assert_eq!(saved, vec!["line 348".to_string(), "line 349".to_string()]);
    }

    #[test]
    fn restores_only_the_persisted_tail() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        save_json(store.as_ref(), SCAN_LOG_KEY, &["a", "b", "c"]).unwrap();

        let log = ScanLog::new(300, 2, store);
        assert_eq!(log.lines().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn clear_removes_persisted_tail() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut log = ScanLog::new(10, 2, Arc::clone(&store));
        log.append("Scan dimulai");
        assert!(store.get(SCAN_LOG_KEY).unwrap().is_some());

        log.clear();
        assert!(log.is_empty());
        assert_eq!(store.get(SCAN_LOG_KEY).unwrap(), None);
    }

    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::NoDataDir)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }
    }

    #[test]
    fn storage_failures_are_ignored() {
        let mut log = ScanLog::new(5, 2, Arc::new(BrokenStore));
        log.append("tetap jalan");
        log.clear();
        log.append("lagi");
        assert_eq!(log.len(), 1);
    }
}
