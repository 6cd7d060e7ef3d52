pub mod app;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod scheduling;
pub mod state;

pub use app::app;
pub use state::AppState;
