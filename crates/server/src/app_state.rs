use session_core::SessionController;

use crate::registry::SessionRegistry;

pub struct AppState {
    pub(crate) controller: SessionController,
    pub(crate) sessions: SessionRegistry,
    pub(crate) max_upload_bytes: usize,
}

impl AppState {
    pub fn new(controller: SessionController, max_sessions: usize, max_upload_bytes: usize) -> Self {
        Self {
            controller,
            sessions: SessionRegistry::new(max_sessions),
            max_upload_bytes,
        }
    }
}
