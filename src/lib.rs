pub mod app;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod date_key;
pub mod debounce;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
