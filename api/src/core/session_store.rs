//! Per-session transcript store.

use std::{collections::HashMap, sync::Arc};

use companion_core::Transcript;
use tokio::sync::{Mutex, RwLock};

/// Session-keyed transcripts.
///
/// Each transcript sits behind its own lock so one session's turns
/// serialize (a turn finishes before the next begins) while distinct
/// sessions proceed in parallel.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, Arc<Mutex<Transcript>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches a session's transcript, seeding a fresh one (greeting
    /// included) on first touch.
    pub async fn get_or_seed(&self, session: &str) -> Arc<Mutex<Transcript>> {
        if let Some(t) = self.inner.read().await.get(session).cloned() {
            return t;
        }
        let mut w = self.inner.write().await;
        w.entry(session.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Transcript::seeded())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_core::GREETING;

    #[tokio::test]
    async fn seeds_once_and_returns_same_transcript() {
        let store = SessionStore::new();
        let a = store.get_or_seed("s1").await;
        {
            let t = a.lock().await;
            assert_eq!(t.len(), 1);
            assert_eq!(t.turns()[0].text, GREETING);
        }
        let b = store.get_or_seed("s1").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.get_or_seed("s1").await;
        let b = store.get_or_seed("s2").await;
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
