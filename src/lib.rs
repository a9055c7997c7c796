pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod router;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_store, resolve_data_path};
