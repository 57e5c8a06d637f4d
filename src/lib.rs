// Library exports for integration tests and the server binary

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod faq;
pub mod i18n;
pub mod metrics;
pub mod models;
pub mod retry;
pub mod server;
pub mod translation;
