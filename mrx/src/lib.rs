pub mod client;
pub mod collector;
pub mod config;
pub mod r#loop;
pub mod metrics;
