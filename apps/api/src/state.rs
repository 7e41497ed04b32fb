use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::Config;
use crate::interview::session::SessionState;
use crate::jd::JobDescriptionIndex;
use crate::llm_client::LlmClient;

/// One session behind its own lock. A turn holds only this mutex while it
/// awaits the model, so a slow turn never stalls other sessions.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// In-memory session store. The map lock is held only to insert or look up a
/// session handle, never across a model call. Sessions live for the duration
/// of one screening conversation and are never persisted across restarts.
pub type SessionStore = Arc<RwLock<HashMap<Uuid, SharedSession>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Job descriptions loaded at startup; read-only afterwards.
    pub jds: Arc<JobDescriptionIndex>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(llm: LlmClient, config: Config, jds: JobDescriptionIndex) -> Self {
        Self {
            llm,
            config,
            jds: Arc::new(jds),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::interview::session::fixtures;

    #[tokio::test]
    async fn test_held_session_turn_does_not_block_the_store_or_other_sessions() {
        let store: SessionStore = Arc::new(RwLock::new(HashMap::new()));
        let first = fixtures::session();
        let second = fixtures::session();
        let (first_id, second_id) = (first.id, second.id);
        store
            .write()
            .await
            .insert(first_id, Arc::new(Mutex::new(first)));
        store
            .write()
            .await
            .insert(second_id, Arc::new(Mutex::new(second)));

        // Simulate an in-flight turn: the first session's mutex is held.
        let in_flight = store.read().await.get(&first_id).cloned().unwrap();
        let _turn = in_flight.lock().await;

        // The map and the second session must stay reachable meanwhile.
        let other = tokio::time::timeout(Duration::from_millis(50), async {
            let handle = store.read().await.get(&second_id).cloned().unwrap();
            let session = handle.lock().await;
            session.id
        })
        .await
        .expect("second session blocked behind the first session's turn");
        assert_eq!(other, second_id);
    }
}
