//! Sync session: authenticate, then push or pull the whole contact list.
//!
//! ```text
//! Unauthenticated ──authenticate──▶ Authenticated ──upload──▶ Uploading ──▶ Authenticated
//!                                                 └─download─▶ Downloading ─▶ Authenticated
//! ```
//!
//! Both transfers go through a local staging file, so the bytes sent or
//! received are always inspectable on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::auth::{CodeSource, Credential, OAuthClient};
use super::hash::content_hash;
use super::remote::RemoteStore;
use crate::codec;
use crate::error::{Error, Result};
use crate::model::Contact;
use crate::storage::atomic_write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayState {
    Unauthenticated,
    Authenticated,
    Uploading,
    Downloading,
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub remote_path: String,
    pub contacts: usize,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    InSync,
    Differs,
    RemoteMissing,
}

impl SyncState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InSync => "in_sync",
            Self::Differs => "differs",
            Self::RemoteMissing => "remote_missing",
        }
    }
}

/// Local registry compared with the remote object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub remote_path: String,
    pub local_contacts: usize,
    pub local_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_contacts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_sha256: Option<String>,
}

/// One sync session against a remote store.
pub struct SyncGateway<S> {
    store: S,
    staging_path: PathBuf,
    remote_path: String,
    credential: Option<Credential>,
    state: GatewayState,
}

impl<S: RemoteStore> SyncGateway<S> {
    pub fn new(store: S, staging_path: impl Into<PathBuf>, remote_path: impl Into<String>) -> Self {
        Self {
            store,
            staging_path: staging_path.into(),
            remote_path: remote_path.into(),
            credential: None,
            state: GatewayState::Unauthenticated,
        }
    }

    #[must_use]
    pub fn state(&self) -> GatewayState {
        self.state
    }

    #[must_use]
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    #[must_use]
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Use a credential obtained elsewhere, skipping the code exchange.
    pub fn authorize(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.state = GatewayState::Authenticated;
    }

    /// Obtain a code from `source` and exchange it for a credential.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth`; the gateway stays unauthenticated.
    pub async fn authenticate(&mut self, oauth: &OAuthClient, source: &mut impl CodeSource) -> Result<()> {
        let code = source.authorization_code(&oauth.authorize_url())?;
        let credential = oauth.exchange(&code).await?;
        self.authorize(credential);
        info!("sync session authenticated");
        Ok(())
    }

    /// Encode `contacts` to the staging file and replace the remote object
    /// with its bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotAuthenticated` before authentication, or
    /// `Error::Transport` if staging or sending fails.
    pub async fn upload(&mut self, contacts: &[Contact]) -> Result<UploadSummary> {
        let credential = self.begin(GatewayState::Uploading)?;
        let result = self.push(&credential, contacts).await;
        self.state = GatewayState::Authenticated;
        result
    }

    /// Fetch the remote object through the staging file and decode it.
    ///
    /// A missing remote object yields an empty list. Lines that do not
    /// decode are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotAuthenticated` before authentication, or
    /// `Error::Transport` if fetching or staging fails.
    pub async fn download(&mut self) -> Result<Vec<Contact>> {
        let credential = self.begin(GatewayState::Downloading)?;
        let result = self.pull(&credential).await;
        self.state = GatewayState::Authenticated;
        result
    }

    /// Compare the encoded `contacts` with the remote object by SHA-256.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotAuthenticated` before authentication, or
    /// `Error::Transport` if the remote object cannot be fetched.
    pub async fn status(&mut self, contacts: &[Contact]) -> Result<SyncStatus> {
        let credential = self.begin(GatewayState::Downloading)?;
        let result = self.store.download(&credential, &self.remote_path).await;
        self.state = GatewayState::Authenticated;

        let local = codec::encode_all(contacts);
        let local_sha256 = content_hash(local.as_bytes());

        let (state, remote_contacts, remote_sha256) = match result {
            Ok(bytes) => {
                let remote_sha256 = content_hash(&bytes);
                let remote_contacts = codec::decode_lines(&String::from_utf8_lossy(&bytes)).len();
                let state = if remote_sha256 == local_sha256 {
                    SyncState::InSync
                } else {
                    SyncState::Differs
                };
                (state, Some(remote_contacts), Some(remote_sha256))
            }
            Err(Error::RemoteNotFound { .. }) => (SyncState::RemoteMissing, None, None),
            Err(e) => return Err(e),
        };

        Ok(SyncStatus {
            state,
            remote_path: self.remote_path.clone(),
            local_contacts: contacts.len(),
            local_sha256,
            remote_contacts,
            remote_sha256,
        })
    }

    fn begin(&mut self, next: GatewayState) -> Result<Credential> {
        let credential = self.credential.clone().ok_or(Error::NotAuthenticated)?;
        self.state = next;
        Ok(credential)
    }

    async fn push(&self, credential: &Credential, contacts: &[Contact]) -> Result<UploadSummary> {
        let text = codec::encode_all(contacts);
        atomic_write(&self.staging_path, &text).map_err(|e| self.staging_error(&e))?;
        let bytes = fs::read(&self.staging_path).map_err(|e| self.staging_error(&e))?;

        let summary = UploadSummary {
            remote_path: self.remote_path.clone(),
            contacts: contacts.len(),
            bytes: bytes.len(),
            sha256: content_hash(&bytes),
        };

        self.store.upload(credential, &self.remote_path, bytes).await?;
        info!(
            remote_path = %self.remote_path,
            contacts = summary.contacts,
            "uploaded contacts"
        );
        Ok(summary)
    }

    async fn pull(&self, credential: &Credential) -> Result<Vec<Contact>> {
        let bytes = match self.store.download(credential, &self.remote_path).await {
            Ok(bytes) => bytes,
            Err(Error::RemoteNotFound { path }) => {
                warn!(remote_path = %path, "remote contacts file not found, nothing to download");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        atomic_write(&self.staging_path, &bytes).map_err(|e| self.staging_error(&e))?;
        let staged = fs::read(&self.staging_path).map_err(|e| self.staging_error(&e))?;

        let contacts = codec::decode_lines(&String::from_utf8_lossy(&staged));
        info!(
            remote_path = %self.remote_path,
            contacts = contacts.len(),
            "downloaded contacts"
        );
        Ok(contacts)
    }

    fn staging_error(&self, e: &dyn std::fmt::Display) -> Error {
        Error::Transport(format!(
            "staging file {}: {e}",
            self.staging_path.display()
        ))
    }
}
