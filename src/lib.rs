//! Personal to-do list service: user accounts, bearer-token auth, and
//! per-user todo CRUD with filtered listing, bulk operations and statistics.

pub mod app;
pub mod config;
pub mod error;
pub mod password;
pub mod routes;
pub mod state;
pub mod store;
pub mod token;

pub use app::app;
pub use config::Config;
pub use state::AppState;
