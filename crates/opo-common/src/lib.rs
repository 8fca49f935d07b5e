//! Common utilities for opo
//!
//! This crate provides the error type shared by the opo crates.

pub mod error;

pub use error::{OpoError, Result};
