pub mod cli;
pub mod cmd;
pub mod config;
pub mod output;
pub mod transport;
