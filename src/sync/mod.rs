//! Remote backup of the contact list.
//!
//! - **Auth**: OAuth authorization-code exchange for an access token
//! - **Remote**: the [`RemoteStore`] trait, the Yandex Disk client and an
//!   in-memory store
//! - **Gateway**: the sync session state machine (upload, download, status)
//! - **Hashing**: SHA-256 content hashes for status checks
//!
//! # File Format
//!
//! The remote object uses the same line format as the local contacts file:
//! ```text
//! [0] [Иван] [Иванов] [+79991234567] [ivan@test.ru]
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut gateway = SyncGateway::new(YandexDisk::new(api_url), staging, "app:/contacts.txt");
//! gateway.authenticate(&oauth, &mut FixedCode(code)).await?;
//! gateway.upload(registry.contacts()).await?;
//! ```

mod auth;
#[cfg(test)]
mod canned;
mod gateway;
mod hash;
mod remote;

pub use auth::{authorize_url, parse_token_response, validate_code, CodeSource, Credential, FixedCode, OAuthClient};
pub use gateway::{GatewayState, SyncGateway, SyncState, SyncStatus, UploadSummary};
pub use hash::content_hash;
pub use remote::{MemoryStore, RemoteStore, YandexDisk};
