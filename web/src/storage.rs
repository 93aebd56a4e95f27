use shared::leaderboard::{Leaderboard, LeaderboardError, ResultStore};
use web_sys::Storage;

use crate::browser;

/// `window.localStorage`, when the browser grants it.
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            browser::warn("localStorage is not available; results will not persist");
        }
        Self { storage }
    }

    /// The stored leaderboard, or an empty one if the stored value is unreadable.
    pub fn leaderboard(&self) -> Leaderboard {
        Leaderboard::load(self).unwrap_or_else(|err| {
            browser::warn(&format!("{err}; starting with an empty leaderboard"));
            Leaderboard::default()
        })
    }
}

impl ResultStore for LocalStore {
    fn load(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), LeaderboardError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| LeaderboardError::Unavailable("localStorage is not available".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| LeaderboardError::Unavailable(format!("{e:?}")))
    }
}
