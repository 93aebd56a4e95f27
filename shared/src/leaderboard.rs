use std::collections::HashMap;
use std::fmt;

use crate::protocol::ResultRecord;

/// Local storage key holding the JSON-encoded leaderboard.
pub const STORAGE_KEY: &str = "typingTestResults";

/// Entries kept after every save.
pub const LEADERBOARD_CAPACITY: usize = 10;

#[derive(Debug)]
pub enum LeaderboardError {
    /// Stored content is not a JSON array of results.
    Malformed(serde_json::Error),
    Encode(serde_json::Error),
    /// The backing store rejected the write.
    Unavailable(String),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::Malformed(e) => write!(f, "stored leaderboard is malformed: {e}"),
            LeaderboardError::Encode(e) => write!(f, "could not encode leaderboard: {e}"),
            LeaderboardError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for LeaderboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LeaderboardError::Malformed(e) | LeaderboardError::Encode(e) => Some(e),
            LeaderboardError::Unavailable(_) => None,
        }
    }
}

/// Durable string key/value storage, e.g. the browser's `localStorage`.
pub trait ResultStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError>;
}

/// In-process store for tests and hosts without a browser.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl ResultStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Top results, best WPM first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Leaderboard {
    entries: Vec<ResultRecord>,
}

impl Leaderboard {
    /// Read the board from `store`. A missing key is an empty board.
    pub fn load<S: ResultStore + ?Sized>(store: &S) -> Result<Self, LeaderboardError> {
        match store.load(STORAGE_KEY) {
            Some(raw) => Self::from_json(&raw),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, LeaderboardError> {
        let mut entries: Vec<ResultRecord> =
            serde_json::from_str(raw).map_err(LeaderboardError::Malformed)?;
        // stored order is not trusted
        entries.sort_by(|a, b| b.wpm.cmp(&a.wpm));
        Ok(Self { entries })
    }

    /// Append `result`, re-sort descending by WPM and keep the top entries.
    pub fn record(&mut self, result: ResultRecord) {
        self.entries.push(result);
        self.entries.sort_by(|a, b| b.wpm.cmp(&a.wpm));
        self.entries.truncate(LEADERBOARD_CAPACITY);
    }

    pub fn persist<S: ResultStore + ?Sized>(&self, store: &mut S) -> Result<(), LeaderboardError> {
        let raw = serde_json::to_string(&self.entries).map_err(LeaderboardError::Encode)?;
        store.save(STORAGE_KEY, &raw)
    }

    pub fn entries(&self) -> &[ResultRecord] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with their 1-based rank.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &ResultRecord)> {
        self.entries.iter().enumerate().map(|(i, r)| (i + 1, r))
    }
}
