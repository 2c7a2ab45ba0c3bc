use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
};

use session_core::SessionState;
use shared::domain::SessionId;
use tokio::sync::Mutex;
use tracing::info;

/// One browser session. The mutex is held for the whole of an operation,
/// including any completion call, so requests on a session run one at a time.
pub(crate) struct SessionSlot {
    pub(crate) state: Mutex<SessionState>,
    touched: AtomicU64,
}

/// In-memory session table. When full, creating a session evicts the one
/// touched least recently.
pub(crate) struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<SessionSlot>>>,
    max_sessions: usize,
    clock: AtomicU64,
}

impl SessionRegistry {
    pub(crate) fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            clock: AtomicU64::new(0),
        }
    }

    pub(crate) fn create(&self) -> SessionId {
        let id = SessionId::new();
        let slot = Arc::new(SessionSlot {
            state: Mutex::new(SessionState::new()),
            touched: AtomicU64::new(self.tick()),
        });

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.touched.load(Ordering::Relaxed))
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            info!(session_id = %oldest, "evicted idle session");
        }
        sessions.insert(id, slot);
        id
    }

    pub(crate) fn get(&self, id: SessionId) -> Option<Arc<SessionSlot>> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        let slot = sessions.get(&id)?.clone();
        slot.touched.store(self.tick(), Ordering::Relaxed);
        Some(slot)
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}
