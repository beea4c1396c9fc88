//! # Burn Text CNN
//!
//! Cross-validated training and evaluation of a convolutional text classifier.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Utilities
pub mod utils;

/// CLI devices, backends and option parsing
pub mod cli;

/// Error macros
#[macro_use]
extern crate anyhow;
