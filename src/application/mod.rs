//! # Application Layer
//!
//! The subscription service and the repository port it orchestrates.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
