/// Shared modules for the stocksim terminal dashboards
pub mod classify;
pub mod control;
pub mod error;
pub mod fmt;
pub mod market;
pub mod session;
pub mod traders;
pub mod types;
pub mod websocket;
