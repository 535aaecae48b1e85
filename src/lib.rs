pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod export;
pub mod i18n;
pub mod models;
pub mod storage;
