//! Common types and utilities shared across the hours-of-work components

pub mod config;
pub mod currency;
pub mod error;
pub mod types;

pub use config::Config;
pub use currency::SymbolTable;
pub use error::*;
pub use types::*;
