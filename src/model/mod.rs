//! Data models for the contact book.
//!
//! - [`Contact`]: one person, identified by a registry-unique id
//! - [`BirthDate`]: an optional day-month pair

pub mod contact;

pub use contact::{BirthDate, Contact, UNKNOWN_BIRTH_DATE};
