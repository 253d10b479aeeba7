//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// Contact book with Yandex Disk backup
#[derive(Parser, Debug)]
#[command(name = "cb", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Contacts file path
    #[arg(long, short = 'f', global = true, env = "CB_FILE")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty contacts file
    Init {
        /// Truncate an existing contacts file
        #[arg(long)]
        force: bool,
    },

    /// Print version, the contacts file in use and the sync target
    Version,

    /// List all contacts
    List,

    /// Add a contact
    Add(AddArgs),

    /// Change one field of a contact
    Edit {
        /// Contact id
        id: u32,

        /// Field name (first_name, second_name, phone, email, date_of_birth)
        field: String,

        /// New value (empty clears a birth date)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Remove a contact
    #[command(alias = "rm")]
    Remove {
        /// Contact id
        id: u32,
    },

    /// Set or clear a contact's birth date
    Birthday {
        /// Contact id
        id: u32,

        /// Birth date as dd.mm (omit to clear)
        date: Option<String>,
    },

    /// Search by first name, second name or phone
    Search {
        /// Field to search
        field: String,

        /// Case-insensitive substring
        query: String,
    },

    /// Filter by any field
    Filter {
        /// Field to filter on
        field: String,

        /// Case-insensitive substring
        query: String,
    },

    /// List contacts ordered by a field
    Sort {
        /// Field to sort by
        field: String,
    },

    /// Show birthdays in the current week
    Upcoming {
        /// Reference day as YYYY-MM-DD (default: today)
        #[arg(long)]
        today: Option<String>,
    },

    /// Show the most common first names
    Breakdown,

    /// Back up or restore contacts on Yandex Disk
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Contact Commands
// ============================================================================

#[derive(Args, Debug)]
pub struct AddArgs {
    /// First name (capitalized, letters only)
    pub first_name: String,

    /// Second name (capitalized, letters only)
    pub second_name: String,

    /// Phone as +7 followed by ten digits
    pub phone: String,

    /// Email address
    pub email: String,

    /// Birth date as dd.mm
    #[arg(long, short = 'b')]
    pub birthday: Option<String>,
}

// ============================================================================
// Sync Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Print the URL that grants access to the app folder
    AuthUrl,

    /// Replace the remote copy with the local contacts
    Upload(SyncAuthArgs),

    /// Replace the local contacts with the remote copy
    Download(SyncAuthArgs),

    /// Compare the local contacts with the remote copy
    Status(SyncAuthArgs),

    /// Store sync settings in ~/.contactbook/config.json
    Configure(ConfigureArgs),
}

#[derive(Args, Debug, Default)]
pub struct SyncAuthArgs {
    /// Access token (skips the authorization code exchange)
    #[arg(long, env = "CB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Authorization code (prompted for when omitted)
    #[arg(long)]
    pub code: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ConfigureArgs {
    /// OAuth application id
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth application secret
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Remote path (default: app:/contacts.txt)
    #[arg(long)]
    pub remote_path: Option<String>,

    /// Local staging file
    #[arg(long)]
    pub staging_path: Option<PathBuf>,

    /// Disk REST API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// OAuth server base URL
    #[arg(long)]
    pub oauth_url: Option<String>,
}
