//! In-memory storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{
    InterpretationRecord, NewInterpretation, QuotaRecord, day_bounds_millis, now_millis, to_millis,
};
use crate::traits::{InterpretationStore, QuotaStore};

/// Simple in-memory store.
///
/// Suitable for development, the demo deployment and tests. State is lost on
/// restart; use the SQL backend for anything persistent.
#[derive(Debug, Default)]
pub struct MemoryStore {
    quotas: Mutex<HashMap<(String, String), QuotaRecord>>,
    /// Insertion-ordered log.
    interpretations: Mutex<Vec<InterpretationRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored readings across all users.
    #[inline]
    pub fn interpretation_count(&self) -> usize {
        self.interpretations.lock().len()
    }

    /// Check if no readings are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.interpretations.lock().is_empty()
    }

    /// Seed a quota counter directly (for fixtures).
    pub fn set_count(&self, user_id: &str, date: &str, count: u32) {
        let now = now_millis();
        let mut quotas = self.quotas.lock();
        let record = quotas
            .entry((user_id.to_string(), date.to_string()))
            .or_insert_with(|| QuotaRecord {
                user_id: user_id.to_string(),
                date: date.to_string(),
                count: 0,
                created_at: now,
                updated_at: now,
            });
        record.count = count;
        record.updated_at = now;
    }
}

#[async_trait]
impl QuotaStore for MemoryStore {
    async fn get_or_create(&self, user_id: &str, date: &str) -> Result<QuotaRecord, StoreError> {
        let mut quotas = self.quotas.lock();
        let record = quotas
            .entry((user_id.to_string(), date.to_string()))
            .or_insert_with(|| {
                let now = now_millis();
                QuotaRecord {
                    user_id: user_id.to_string(),
                    date: date.to_string(),
                    count: 0,
                    created_at: now,
                    updated_at: now,
                }
            });
        Ok(record.clone())
    }

    async fn find(&self, user_id: &str, date: &str) -> Result<Option<QuotaRecord>, StoreError> {
        let quotas = self.quotas.lock();
        Ok(quotas
            .get(&(user_id.to_string(), date.to_string()))
            .cloned())
    }

    async fn increment_within(
        &self,
        user_id: &str,
        date: &str,
        limit: u32,
    ) -> Result<Option<QuotaRecord>, StoreError> {
        // Check and increment under one lock acquisition.
        let mut quotas = self.quotas.lock();
        let Some(record) = quotas.get_mut(&(user_id.to_string(), date.to_string())) else {
            return Ok(None);
        };
        if record.count >= limit {
            return Ok(None);
        }
        record.count += 1;
        record.updated_at = now_millis();
        Ok(Some(record.clone()))
    }

    async fn reset(&self, user_id: &str, date: &str) -> Result<bool, StoreError> {
        let mut quotas = self.quotas.lock();
        match quotas.get_mut(&(user_id.to_string(), date.to_string())) {
            Some(record) => {
                record.count = 0;
                record.updated_at = now_millis();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl InterpretationStore for MemoryStore {
    async fn create(&self, new: NewInterpretation) -> Result<InterpretationRecord, StoreError> {
        let record =
            InterpretationRecord::from_new(new, Uuid::new_v4().to_string(), now_millis());
        self.interpretations.lock().push(record.clone());
        Ok(record)
    }

    async fn update_interpretation(&self, id: &str, text: &str) -> Result<bool, StoreError> {
        let mut log = self.interpretations.lock();
        match log.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.interpretation = text.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<InterpretationRecord>, StoreError> {
        let log = self.interpretations.lock();
        // Reverse insertion order first so the stable sort keeps later
        // inserts ahead on timestamp ties.
        let mut records: Vec<InterpretationRecord> = log
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<InterpretationRecord>, StoreError> {
        let log = self.interpretations.lock();
        Ok(log.iter().find(|r| r.id == id).cloned())
    }

    async fn count_on_day(&self, user_id: &str, date: &str) -> Result<u64, StoreError> {
        let (start, end) = day_bounds_millis(date)?;
        let log = self.interpretations.lock();
        let count = log
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| {
                let ts = to_millis(r.created_at);
                ts >= start && ts < end
            })
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use mentob_core::{DrawnCard, tarot::MAJOR_ARCANA, today_utc};

    use super::*;

    fn reading(user: &str, question: &str) -> NewInterpretation {
        NewInterpretation {
            user_id: user.to_string(),
            question: question.to_string(),
            spread_type: "single".to_string(),
            cards: vec![DrawnCard::from_card(&MAJOR_ARCANA[3], false)],
            interpretation: "The Empress speaks of abundance.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.get_or_create("u1", "2026-01-01").await.unwrap();
        assert_eq!(first.count, 0);

        store.increment_within("u1", "2026-01-01", 3).await.unwrap();
        let second = store.get_or_create("u1", "2026-01-01").await.unwrap();
        assert_eq!(second.count, 1);
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_increment_stops_at_limit() {
        let store = MemoryStore::new();
        store.get_or_create("u1", "2026-01-01").await.unwrap();

        for expected in 1..=2 {
            let rec = store.increment_within("u1", "2026-01-01", 2).await.unwrap();
            assert_eq!(rec.unwrap().count, expected);
        }
        assert!(
            store
                .increment_within("u1", "2026-01-01", 2)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.find("u1", "2026-01-01").await.unwrap().unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_increment_without_row_is_noop() {
        let store = MemoryStore::new();
        assert!(store.increment_within("ghost", "2026-01-01", 3).await.unwrap().is_none());
        assert!(store.find("ghost", "2026-01-01").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset() {
        let store = MemoryStore::new();
        assert!(!store.reset("u1", "2026-01-01").await.unwrap());
        store.set_count("u1", "2026-01-01", 3);
        assert!(store.reset("u1", "2026-01-01").await.unwrap());
        assert_eq!(store.find("u1", "2026-01-01").await.unwrap().unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_history_newest_first_and_capped() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.create(reading("u1", &format!("q{i}"))).await.unwrap();
        }
        store.create(reading("u2", "other")).await.unwrap();

        let history = store.list_by_user("u1", 3).await.unwrap();
        let questions: Vec<&str> = history.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(questions, ["q4", "q3", "q2"]);
        assert_eq!(store.interpretation_count(), 6);
    }

    #[tokio::test]
    async fn test_get_and_correct() {
        let store = MemoryStore::new();
        let created = store.create(reading("u1", "love?")).await.unwrap();

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(store.get("missing").await.unwrap().is_none());

        assert!(store.update_interpretation(&created.id, "fixed").await.unwrap());
        assert!(!store.update_interpretation("missing", "fixed").await.unwrap());
        assert_eq!(
            store.get(&created.id).await.unwrap().unwrap().interpretation,
            "fixed"
        );
    }

    #[tokio::test]
    async fn test_count_on_day() {
        let store = MemoryStore::new();
        store.create(reading("u1", "a")).await.unwrap();
        store.create(reading("u1", "b")).await.unwrap();
        store.create(reading("u2", "c")).await.unwrap();

        assert_eq!(store.count_on_day("u1", &today_utc()).await.unwrap(), 2);
        assert_eq!(store.count_on_day("u1", "2000-01-01").await.unwrap(), 0);
    }
}
