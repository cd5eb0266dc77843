pub mod app;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod repositories;
pub mod services;
