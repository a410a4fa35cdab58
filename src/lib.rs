pub mod actors;
pub mod api;
pub mod cli;
pub mod comparison;
pub mod error;
pub mod fetch_cache;
pub mod github;
pub mod health;
pub mod models;
pub mod ranking;
pub mod selection;
pub mod types;
