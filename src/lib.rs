//! Tiered Cache - a multi-tier read-through cache
//!
//! Reads fall through an in-process memory tier to a SQLite tier; hits in
//! the slower tier are copied back into the faster one with their remaining
//! TTL.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use facade::Cache;
pub use tasks::spawn_prune_task;
