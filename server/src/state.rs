use std::sync::Arc;

use gptnix::QueryHandler;

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<QueryHandler>,
}

impl AppState {
    pub fn new(handler: QueryHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}
