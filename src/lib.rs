pub mod auth;
pub mod config;
pub mod customization;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ordering;
pub mod state;
