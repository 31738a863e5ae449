use std::collections::VecDeque;
use std::fs as std_fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::HistoryError;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One previously-run query.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryItem {
    pub id: String,
    pub query: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub result_count: usize,
}

impl QueryHistoryItem {
    pub fn new(query: impl Into<String>, result_count: usize) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            query: query.into(),
            timestamp: (now.unix_timestamp_nanos() / 1_000_000) as i64,
            result_count,
        }
    }
}

/// Bounded, oldest-first list of queries.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct QueryHistory {
    capacity: usize,
    items: VecDeque<QueryHistoryItem>,
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl QueryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::new(),
        }
    }

    /// Rebuilds a history from stored items, keeping only the newest `capacity` of them.
    pub fn from_items(capacity: usize, items: impl IntoIterator<Item = QueryHistoryItem>) -> Self {
        let mut history = Self::with_capacity(capacity);
        for item in items {
            history.push(item);
        }
        history
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `item`, evicting the oldest entries beyond capacity.
    pub fn push(&mut self, item: QueryHistoryItem) {
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueryHistoryItem> {
        self.items.iter()
    }

    /// Newest first.
    pub fn recent(&self) -> impl Iterator<Item = &QueryHistoryItem> {
        self.items.iter().rev()
    }

    pub fn to_vec(&self) -> Vec<QueryHistoryItem> {
        self.items.iter().cloned().collect()
    }
}

/// Persistence for [`QueryHistory`].
pub trait HistoryStore {
    fn load(&self) -> Result<QueryHistory, HistoryError>;
    fn save(&self, history: &QueryHistory) -> Result<(), HistoryError>;
    fn clear(&self) -> Result<(), HistoryError>;
}

/// Stores history as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
    capacity: usize,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn load(&self) -> Result<QueryHistory, HistoryError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no history file; starting empty");
            return Ok(QueryHistory::with_capacity(self.capacity));
        }
        let contents =
            std_fs::read_to_string(&self.path).map_err(|source| HistoryError::Read {
                path: self.path.clone(),
                source,
            })?;
        let items: Vec<QueryHistoryItem> =
            serde_json::from_str(&contents).map_err(|source| HistoryError::Parse {
                path: self.path.clone(),
                source,
            })?;
        if items.len() > self.capacity {
            warn!(
                path = %self.path.display(),
                stored = items.len(),
                capacity = self.capacity,
                "history file exceeds capacity; keeping newest entries"
            );
        }
        Ok(QueryHistory::from_items(self.capacity, items))
    }

    fn save(&self, history: &QueryHistory) -> Result<(), HistoryError> {
        let contents =
            serde_json::to_string_pretty(&history.to_vec()).map_err(HistoryError::Serialize)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std_fs::create_dir_all(parent).map_err(|source| HistoryError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        std_fs::write(&self.path, contents).map_err(|source| HistoryError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn clear(&self) -> Result<(), HistoryError> {
        match std_fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(HistoryError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
