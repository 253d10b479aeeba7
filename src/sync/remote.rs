//! Remote object stores.
//!
//! A store keeps whole objects addressed by path. [`YandexDisk`] talks to the
//! Disk REST API; [`MemoryStore`] keeps objects in a map.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::auth::Credential;
use crate::error::{Error, Result};

/// Trait for remote object stores.
pub trait RemoteStore: Send + Sync {
    /// Store `bytes` at `remote_path`, replacing any existing object.
    fn upload(
        &self,
        credential: &Credential,
        remote_path: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch the object at `remote_path`.
    ///
    /// Returns `Error::RemoteNotFound` if there is no such object.
    fn download(
        &self,
        credential: &Credential,
        remote_path: &str,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Yandex Disk REST API client.
pub struct YandexDisk {
    client: reqwest::Client,
    api_url: String,
}

/// Operation link returned by the resources endpoints.
#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

impl YandexDisk {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn link(
        &self,
        credential: &Credential,
        endpoint: &str,
        query: &[(&str, &str)],
        remote_path: &str,
    ) -> Result<Link> {
        let url = format!("{}/resources/{endpoint}", self.api_url);
        debug!(%url, remote_path, "requesting {endpoint} link");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, credential.header_value())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{endpoint} link request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND && endpoint == "download" {
            return Err(Error::RemoteNotFound {
                path: remote_path.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "{endpoint} link request failed ({status}): {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Failed to parse {endpoint} link: {e}")))
    }
}

impl RemoteStore for YandexDisk {
    async fn upload(&self, credential: &Credential, remote_path: &str, bytes: Vec<u8>) -> Result<()> {
        let link = self
            .link(
                credential,
                "upload",
                &[("path", remote_path), ("overwrite", "true")],
                remote_path,
            )
            .await?;

        let response = self
            .client
            .put(&link.href)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("upload failed ({status}): {body}")));
        }
        Ok(())
    }

    async fn download(&self, credential: &Credential, remote_path: &str) -> Result<Vec<u8>> {
        let link = self
            .link(credential, "download", &[("path", remote_path)], remote_path)
            .await?;

        let response = self
            .client
            .get(&link.href)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("download failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Transport(format!("download failed ({status})")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("download failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// In-process store keyed by remote path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bytes of the object at `remote_path`, if any.
    #[must_use]
    pub fn object(&self, remote_path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(remote_path)
            .cloned()
    }

    pub fn insert(&self, remote_path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(remote_path.into(), bytes.into());
    }
}

impl RemoteStore for MemoryStore {
    async fn upload(&self, _credential: &Credential, remote_path: &str, bytes: Vec<u8>) -> Result<()> {
        self.insert(remote_path, bytes);
        Ok(())
    }

    async fn download(&self, _credential: &Credential, remote_path: &str) -> Result<Vec<u8>> {
        self.object(remote_path).ok_or_else(|| Error::RemoteNotFound {
            path: remote_path.to_string(),
        })
    }
}
