use crate::carousel::Carousel;
use crate::session::SessionController;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionController,
    pub carousel: Arc<Carousel>,
}

impl AppState {
    pub fn new(session: SessionController, carousel: Carousel) -> Self {
        Self {
            session,
            carousel: Arc::new(carousel),
        }
    }
}
