pub mod cli;
pub mod config;
pub mod data;
pub mod ehp;
pub mod fleet;
pub mod logging;
pub mod pins;
pub mod ranking;
pub mod server;
