pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod controller;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod navigate;
pub mod notify;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use controller::DiaryFormController;
pub use state::AppState;
