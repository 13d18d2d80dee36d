//! Common utilities module
//!
//! This module contains shared utilities used across the spectrum pipeline.

pub mod error;

pub use error::{SpectrumError, Result};
