//! Per-process session state: language preferences and message history.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Language returned for users that never set a preference.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Kind-specific part of a history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HistoryPayload {
    #[serde(rename_all = "camelCase")]
    Text {
        original_text: String,
        translated_text: String,
    },
    #[serde(rename_all = "camelCase")]
    Audio {
        original_size_bytes: usize,
        processed_size_bytes: usize,
    },
}

/// One completed request. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub user_id: String,
    pub source_language: String,
    pub target_language: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: HistoryPayload,
}

impl HistoryEntry {
    pub fn new(
        user_id: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        payload: HistoryPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    preferences: DashMap<String, String>,
    history: RwLock<Vec<HistoryEntry>>,
}

/// Shared session store. Cloning is cheap and every clone sees the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the preferred language for `user_id`. Last write wins.
    pub fn set_language(&self, user_id: &str, language: &str) {
        self.inner
            .preferences
            .insert(user_id.to_string(), language.to_string());
        debug!(user_id, language, "Language preference set");
    }

    /// Stored preference, or [`DEFAULT_LANGUAGE`].
    pub fn get_language(&self, user_id: &str) -> String {
        self.preferred_language(user_id)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn preferred_language(&self, user_id: &str) -> Option<String> {
        self.inner
            .preferences
            .get(user_id)
            .map(|entry| entry.value().clone())
    }

    pub fn append_history(&self, entry: HistoryEntry) {
        let mut history = self
            .inner
            .history
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        history.push(entry);
    }

    /// The most recent `limit` entries, optionally restricted to one user,
    /// oldest first.
    pub fn query_history(&self, user_id: Option<&str>, limit: usize) -> Vec<HistoryEntry> {
        let history = self
            .inner
            .history
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut recent: Vec<HistoryEntry> = history
            .iter()
            .rev()
            .filter(|entry| user_id.map_or(true, |u| entry.user_id == u))
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        recent
    }

    pub fn history_len(&self) -> usize {
        self.inner
            .history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_entry(user: &str, text: &str) -> HistoryEntry {
        HistoryEntry::new(
            user,
            "en",
            "es",
            HistoryPayload::Text {
                original_text: text.to_string(),
                translated_text: text.to_string(),
            },
        )
    }

    #[test]
    fn test_language_defaults_and_overwrites() {
        let store = SessionStore::new();
        assert_eq!(store.get_language("u1"), "en");
        assert_eq!(store.preferred_language("u1"), None);

        store.set_language("u1", "fr");
        store.set_language("u1", "de");
        assert_eq!(store.get_language("u1"), "de");
        assert_eq!(store.preferred_language("u1").as_deref(), Some("de"));
        assert_eq!(store.get_language("u2"), "en");
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        other.set_language("u1", "it");
        other.append_history(text_entry("u1", "a"));
        assert_eq!(store.get_language("u1"), "it");
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_query_history_limit_and_order() {
        let store = SessionStore::new();
        for text in ["one", "two", "three"] {
            store.append_history(text_entry("u1", text));
        }
        store.append_history(text_entry("u2", "other"));

        let latest = store.query_history(Some("u1"), 1);
        assert_eq!(latest.len(), 1);
        assert!(matches!(
            &latest[0].payload,
            HistoryPayload::Text { original_text, .. } if original_text == "three"
        ));

        let two = store.query_history(Some("u1"), 2);
        let texts: Vec<_> = two
            .iter()
            .map(|e| match &e.payload {
                HistoryPayload::Text { original_text, .. } => original_text.as_str(),
                HistoryPayload::Audio { .. } => "",
            })
            .collect();
        assert_eq!(texts, ["two", "three"]);

        assert_eq!(store.query_history(None, 50).len(), 4);
        assert!(store.query_history(Some("nobody"), 50).is_empty());
        assert!(store.query_history(None, 0).is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let store = SessionStore::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let user = format!("u{}", t);
                    for i in 0..100 {
                        store.set_language(&user, if i == 99 { "fr" } else { "de" });
                        store.append_history(text_entry(&user, "x"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.history_len(), 800);
        for t in 0..8 {
            let user = format!("u{}", t);
            assert_eq!(store.get_language(&user), "fr");
            assert_eq!(store.query_history(Some(&user), 1000).len(), 100);
        }
    }

    #[test]
    fn test_entry_serialization_is_flat() {
        let entry = HistoryEntry::new(
            "u1",
            "en",
            "es",
            HistoryPayload::Audio {
                original_size_bytes: 10,
                processed_size_bytes: 1068,
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["originalSizeBytes"], 10);
        assert_eq!(json["processedSizeBytes"], 1068);

        let back: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
