//! Configuration module for HashStream
//!
//! Provides the hashing parameters, their defaults and validation,
//! config files, and CLI arguments.

mod settings;

pub use settings::*;
