//! Contacts file storage.
//!
//! The registry is hydrated from one flat text file at start and written
//! back to the same file, in full, when a mutating command succeeds.
//!
//! # Submodules
//!
//! - [`file`] - Atomic writes and the [`ContactsFile`] handle

pub mod file;

pub use file::{atomic_write, ContactsFile};
