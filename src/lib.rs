pub mod app;
pub mod bridge;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod mood;
pub mod progress;
pub mod report;
pub mod rollover;
pub mod state;
pub mod storage;
pub mod tips;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::Repository;
