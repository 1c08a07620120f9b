use std::sync::Arc;

use handoff_core::repositories::PendingSessionRepository;
use handoff_core::services::HandoffService;

pub struct AppState<R: PendingSessionRepository> {
    pub service: Arc<HandoffService<R>>,
}

impl<R: PendingSessionRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
