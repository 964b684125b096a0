pub mod client;
pub mod config;
pub mod poller;
pub mod tasklist;
pub mod types;

pub use types::*;
