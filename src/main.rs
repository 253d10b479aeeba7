//! Contact book CLI entry point.

use clap::Parser;
use cb::cli::commands;
use cb::cli::{Cli, Commands, OutputFormat};
use cb::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // --json wins over --format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        cli.format
    };

    // Run the command and handle errors
    match run(&cli, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if format == OutputFormat::Json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,reqwest=info,hyper_util=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, format: OutputFormat) -> Result<(), Error> {
    let file = cli.file.as_ref();

    match &cli.command {
        Commands::Init { force } => commands::init::execute(file, *force, format),
        Commands::Version => commands::version::execute(file, format),

        // Contacts
        Commands::List => commands::contact::list(file, format),
        Commands::Add(args) => commands::contact::add(args, file, format),
        Commands::Edit { id, field, value } => {
            commands::contact::edit(*id, field, value, file, format)
        }
        Commands::Remove { id } => commands::contact::remove(*id, file, format),
        Commands::Birthday { id, date } => {
            commands::contact::birthday(*id, date.as_deref(), file, format)
        }

        // Queries
        Commands::Search { field, query } => commands::query::search(field, query, file, format),
        Commands::Filter { field, query } => commands::query::filter(field, query, file, format),
        Commands::Sort { field } => commands::query::sort(field, file, format),
        Commands::Upcoming { today } => commands::query::upcoming(today.as_deref(), file, format),
        Commands::Breakdown => commands::query::breakdown(file, format),

        // Sync
        Commands::Sync { command } => commands::sync::execute(command, file, format),

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
