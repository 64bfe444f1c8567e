//! tagcomplete autocompletes tags in free text fields from merged csv and json tag datasets
#![forbid(
    clippy::missing_docs_in_private_items,
    missing_docs,
    rustdoc::missing_crate_level_docs
)]

#[cfg(feature = "cli")]
pub mod app;
pub mod complete;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod index;
pub mod loader;
pub mod macros;
pub mod utils;
