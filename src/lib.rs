//! contactbook - a contact book with Yandex Disk backup
//!
//! This crate provides the core functionality for the `cb` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Contact, BirthDate)
//! - [`codec`] - Line format for the contacts file and the remote copy
//! - [`registry`] - In-memory contact registry, id allocation and queries
//! - [`storage`] - Contacts file handle with atomic writes
//! - [`sync`] - OAuth and remote upload/download
//! - [`config`] - Configuration management
//! - [`validate`] - Field patterns and field-name normalization
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod storage;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};

/// Escape a value for CSV output (wrap in quotes if it contains commas, quotes, or newlines).
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
