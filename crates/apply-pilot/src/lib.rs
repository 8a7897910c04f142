pub mod config;
pub mod error;
pub mod telemetry;
pub mod webdriver;
pub mod workflows;
