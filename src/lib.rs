pub mod api;
pub mod app;
pub mod carousel;
pub mod charts;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use session::SessionController;
pub use state::AppState;
pub use storage::LocalCache;
