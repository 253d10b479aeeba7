//! Sync command implementations.
//!
//! Network calls run on a tokio runtime created per command.

use crate::cli::{ConfigureArgs, OutputFormat, SyncAuthArgs, SyncCommands};
use crate::config::{save_sync_settings, SyncConfig, SyncSettings};
use crate::error::{AuthError, Error, Result};
use crate::sync::{
    authorize_url, validate_code, CodeSource, Credential, FixedCode, OAuthClient, SyncGateway,
    YandexDisk,
};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

use super::open_contacts;

const CODE_ATTEMPTS: usize = 3;

#[derive(Serialize)]
struct AuthUrlOutput {
    url: String,
}

#[derive(Serialize)]
struct DownloadOutput {
    remote_path: String,
    contacts: usize,
}

/// Execute sync commands.
///
/// # Errors
///
/// Returns configuration, authentication, transport or file errors.
pub fn execute(command: &SyncCommands, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    match command {
        SyncCommands::AuthUrl => auth_url(format),
        SyncCommands::Configure(args) => configure(args, format),
        SyncCommands::Upload(args) => upload(args, file, format),
        SyncCommands::Download(args) => download(args, file, format),
        SyncCommands::Status(args) => status(args, file, format),
    }
}

fn auth_url(format: OutputFormat) -> Result<()> {
    let config = SyncConfig::load()?;
    let url = authorize_url(&config.oauth_url, &require_client_id(&config)?);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&AuthUrlOutput { url })?);
    } else {
        println!("{url}");
    }
    Ok(())
}

fn configure(args: &ConfigureArgs, format: OutputFormat) -> Result<()> {
    let settings = save_sync_settings(SyncSettings {
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
        remote_path: args.remote_path.clone(),
        staging_path: args.staging_path.clone(),
        api_url: args.api_url.clone(),
        oauth_url: args.oauth_url.clone(),
    })?;

    // never echo the secret back
    let shown = SyncSettings {
        client_secret: settings.client_secret.as_ref().map(|_| "***".to_string()),
        ..settings
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&shown)?);
    } else {
        println!("Saved sync settings:");
        println!("{}", serde_json::to_string_pretty(&shown)?);
    }
    Ok(())
}

fn upload(args: &SyncAuthArgs, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let registry = open_contacts(file)?.load()?;
    let config = SyncConfig::load()?;

    let summary = runtime()?.block_on(async {
        let mut gateway = connect(args, &config).await?;
        gateway.upload(registry.contacts()).await
    })?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "Uploaded {} contacts to {} ({} bytes)",
            summary.contacts, summary.remote_path, summary.bytes
        );
    }
    Ok(())
}

fn download(args: &SyncAuthArgs, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let contacts_file = open_contacts(file)?;
    let mut registry = contacts_file.load()?;
    let config = SyncConfig::load()?;

    let contacts = runtime()?.block_on(async {
        let mut gateway = connect(args, &config).await?;
        gateway.download().await
    })?;

    registry.replace_all(contacts);
    contacts_file.save(&registry)?;

    let output = DownloadOutput {
        remote_path: config.remote_path,
        contacts: registry.len(),
    };
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Downloaded {} contacts from {}",
            output.contacts, output.remote_path
        );
    }
    Ok(())
}

fn status(args: &SyncAuthArgs, file: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
    let registry = open_contacts(file)?.load()?;
    let config = SyncConfig::load()?;

    let status = runtime()?.block_on(async {
        let mut gateway = connect(args, &config).await?;
        gateway.status(registry.contacts()).await
    })?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        println!("Remote:  {}", status.remote_path);
        println!("State:   {}", status.state.as_str());
        println!("Local:   {} contacts", status.local_contacts);
        if let Some(count) = status.remote_contacts {
            println!("Remote:  {count} contacts");
        }
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}

/// Build an authenticated gateway: a ready token wins, otherwise the
/// authorization code is exchanged.
async fn connect(args: &SyncAuthArgs, config: &SyncConfig) -> Result<SyncGateway<YandexDisk>> {
    let mut gateway = SyncGateway::new(
        YandexDisk::new(config.api_url.as_str()),
        config.staging_path.as_path(),
        config.remote_path.as_str(),
    );

    if let Some(token) = args.token.as_deref().filter(|t| !t.trim().is_empty()) {
        gateway.authorize(Credential::new(token.trim()));
        return Ok(gateway);
    }

    let client_id = require_client_id(config)?;
    let client_secret = config.client_secret.clone().ok_or_else(|| {
        Error::Config(
            "No OAuth client secret: set CB_CLIENT_SECRET or run `cb sync configure --client-secret`"
                .into(),
        )
    })?;
    let oauth = OAuthClient::new(config.oauth_url.as_str(), client_id, client_secret);

    match &args.code {
        Some(code) => gateway.authenticate(&oauth, &mut FixedCode(code.clone())).await?,
        None => gateway.authenticate(&oauth, &mut StdinCode).await?,
    }
    Ok(gateway)
}

fn require_client_id(config: &SyncConfig) -> Result<String> {
    config.client_id.clone().ok_or_else(|| {
        Error::Config(
            "No OAuth client id: set CB_CLIENT_ID or run `cb sync configure --client-id`".into(),
        )
    })
}

/// Prompts on stderr and reads the code from stdin, re-asking on a
/// malformed code.
struct StdinCode;

impl CodeSource for StdinCode {
    fn authorization_code(&mut self, authorize_url: &str) -> std::result::Result<String, AuthError> {
        let stdin = io::stdin();
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "Open this URL and grant access:\n  {authorize_url}");

        let mut last_error = AuthError::InvalidCode("no code entered".into());
        for _ in 0..CODE_ATTEMPTS {
            let _ = write!(stderr, "Confirmation code: ");
            let _ = stderr.flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => return Err(AuthError::InvalidCode(format!("failed to read code: {e}"))),
            }

            match validate_code(&line) {
                Ok(code) => return Ok(code.to_string()),
                Err(e) => {
                    warn!("{e}");
                    let _ = writeln!(stderr, "{e}");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}
