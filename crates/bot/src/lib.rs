pub mod config;
pub mod constants;
pub mod core;
pub mod errors;
pub mod exchange;
pub mod logging;
pub mod notify;
pub mod types;
