//! the command line application
pub mod cli;
pub mod core;
pub mod host;
pub mod logging;

pub use core::TcApp;
