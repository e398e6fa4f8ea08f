pub mod app;
pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use state::AppState;
