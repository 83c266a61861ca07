//! Core types for regdesk
//!
//! Domain records, form validation and configuration shared by every other crate.

mod candidate;
pub mod config;
pub mod constants;
mod error;
mod form;
mod validation;

pub use candidate::*;
pub use config::Config;
pub use error::*;
pub use form::*;
pub use validation::*;
