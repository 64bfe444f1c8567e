//! configuration: the options, the global instance and validation
pub mod instance;
pub mod options;
pub mod validate;
