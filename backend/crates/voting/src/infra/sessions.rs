//! In-Memory Session Store

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

use crate::domain::entities::ActionState;
use crate::domain::repository::SessionStore;
use crate::domain::value_objects::SessionId;
use crate::error::VotingResult;

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    state: ActionState,
    last_seen_ms: i64,
}

/// Action state per session, kept for as long as the session is active
///
/// Every access refreshes the entry, so expiry slides with activity.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cleanup_at(&self, now_ms: i64, idle_ttl: Duration) -> u64 {
        let ttl_ms = i64::try_from(idle_ttl.as_millis()).unwrap_or(i64::MAX);
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now_ms.saturating_sub(entry.last_seen_ms) < ttl_ms);
        (before - entries.len()) as u64
    }
}

impl SessionStore for MemorySessionStore {
    async fn get_or_create(&self, session_id: SessionId) -> VotingResult<ActionState> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock();
        let entry = entries.entry(session_id).or_insert(SessionEntry {
            state: ActionState::default(),
            last_seen_ms: now_ms,
        });
        entry.last_seen_ms = now_ms;
        Ok(entry.state)
    }

    async fn record_action(
        &self,
        session_id: SessionId,
        today: NaiveDate,
    ) -> VotingResult<ActionState> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries.lock();
        let entry = entries.entry(session_id).or_insert(SessionEntry {
            state: ActionState::default(),
            last_seen_ms: now_ms,
        });
        entry.state.record(today);
        entry.last_seen_ms = now_ms;
        Ok(entry.state)
    }

    async fn cleanup_idle(&self, idle_ttl: Duration) -> VotingResult<u64> {
        let deleted = self.cleanup_at(Utc::now().timestamp_millis(), idle_ttl);
        if deleted > 0 {
            tracing::info!(sessions = deleted, "Cleaned up idle sessions");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_starts_empty() {
        let store = MemorySessionStore::new();
        let state = store.get_or_create(SessionId::new()).await.unwrap();
        assert_eq!(state, ActionState::default());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_record_action_counts_per_day() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();

        store.record_action(id, day(19)).await.unwrap();
        let state = store.record_action(id, day(19)).await.unwrap();
        assert_eq!(state.action_count_today, 2);

        let state = store.record_action(id, day(20)).await.unwrap();
        assert_eq!(state.action_count_today, 1);
        assert_eq!(state.last_action_date, Some(day(20)));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemorySessionStore::new();
        let a = SessionId::new();
        let b = SessionId::new();

        store.record_action(a, day(19)).await.unwrap();
        assert_eq!(store.get_or_create(b).await.unwrap(), ActionState::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_are_not_lost() {
        let store = Arc::new(MemorySessionStore::new());
        let id = SessionId::new();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.record_action(id, day(19)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let state = store.get_or_create(id).await.unwrap();
        assert_eq!(state.action_count_today, 20);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_idle_sessions() {
        let store = MemorySessionStore::new();
        let stale = SessionId::new();
        let fresh = SessionId::new();
        store.get_or_create(stale).await.unwrap();
        store.get_or_create(fresh).await.unwrap();

        let now = Utc::now().timestamp_millis();
        store.entries.lock().get_mut(&stale).unwrap().last_seen_ms = now - 10_000;

        let deleted = store.cleanup_at(now, Duration::from_secs(5));
        assert_eq!(deleted, 1);
        assert_eq!(store.len(), 1);
        assert!(store.entries.lock().contains_key(&fresh));
    }
}
