//! projmgr library
//!
//! Lists installed CMSIS packs and devices and validates solution files.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod parser;
pub mod solution;
pub mod validation;
pub mod worker;

pub use error::{ProjMgrError, Result};
pub use manager::Manager;
pub use parser::Parser;
pub use validation::{ValidationIssue, ValidationResult};
pub use worker::Worker;
