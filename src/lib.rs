pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod store;
pub mod types;
pub mod upload;
