use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ghsync::github::AuthStrategy;
use ghsync::{
    Config, ConfirmMode, ConsoleOperator, Credentials, EntityKind, GitHubClient, SyncEngine,
    SyncOptions,
};

#[derive(Parser)]
#[command(name = "ghsync")]
#[command(about = "Synchronize GitHub labels and milestones between repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize labels and milestones from one repository to others
    Sync {
        /// The repository containing the labels and milestones to use (owner/name)
        from: String,

        /// The repositories to synchronize, or a single pattern such as "org/*"
        #[arg(required = true)]
        to: Vec<String>,

        /// The GitHub token to use for authentication. Required to create, update or delete.
        #[arg(long)]
        token: Option<String>,

        /// Apply every change without asking for confirmation
        #[arg(long)]
        force: bool,

        /// Do not synchronize labels
        #[arg(long)]
        skip_labels: bool,

        /// Do not synchronize milestones
        #[arg(long)]
        skip_milestones: bool,
    },

    /// Manage authentication
    Auth {
        #[command(subcommand)]
        auth_command: AuthCommands,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Show which credentials would be used
    Status {
        /// Token to check instead of the configured method
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init { .. } => Config::default(),
        _ => load_config(cli.config.clone())?,
    };
    init_logging(cli.verbose, &config.logging.level)?;
    info!("Starting ghsync v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Sync {
            from,
            to,
            token,
            force,
            skip_labels,
            skip_milestones,
        } => {
            cmd_sync(
                SyncArgs {
                    from,
                    to,
                    token,
                    force,
                    skip_labels,
                    skip_milestones,
                },
                &config,
            )
            .await
        }
        Commands::Auth { auth_command } => cmd_auth(auth_command, &config),
        Commands::Init { force } => cmd_init(cli.config, force),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool, level: &str) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    // Logs go to stderr so the report and prompts own stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

struct SyncArgs {
    from: String,
    to: Vec<String>,
    token: Option<String>,
    force: bool,
    skip_labels: bool,
    skip_milestones: bool,
}

/// Synchronize labels and milestones according to arguments and configuration
async fn cmd_sync(args: SyncArgs, config: &Config) -> Result<()> {
    let (strategy, credentials) =
        GitHubClient::detect_credentials(&config.github.auth_method, args.token)?;
    info!("Using authentication strategy: {:?}", strategy);

    if !credentials.is_authenticated() {
        println!("⚠️  Not authenticated: differences will be reported but no change can be applied");
        println!("   Provide a personal access token with --token or GITHUB_TOKEN");
    }

    let client = Arc::new(build_client(credentials, config)?);

    let mode = if args.force || config.sync.force {
        ConfirmMode::Force
    } else {
        ConfirmMode::Interactive
    };

    let kinds: Vec<EntityKind> = config
        .enabled_kinds()
        .into_iter()
        .filter(|kind| match kind {
            EntityKind::Labels => !args.skip_labels,
            EntityKind::Milestones => !args.skip_milestones,
        })
        .collect();

    let options = SyncOptions {
        from: args.from,
        targets: args.to,
        kinds,
    };

    let engine = SyncEngine::github(client, mode, Arc::new(ConsoleOperator));
    let summary = engine.run(&options).await?;

    if !summary.failures.is_empty() {
        println!("\n🔍 Repositories that could not be compared:");
        for failure in &summary.failures {
            println!("   ❌ {} ({}): {}", failure.target, failure.kind, failure.error);
        }
    }

    Ok(())
}

fn build_client(credentials: Credentials, config: &Config) -> Result<GitHubClient> {
    match &config.github.api_url {
        Some(url) => GitHubClient::with_base_uri(credentials, url),
        None => GitHubClient::new(credentials),
    }
}

/// Handle authentication commands
fn cmd_auth(auth_command: AuthCommands, config: &Config) -> Result<()> {
    match auth_command {
        AuthCommands::Status { token } => {
            match GitHubClient::detect_credentials(&config.github.auth_method, token) {
                Ok((AuthStrategy::Anonymous, _)) => {
                    println!("❌ Not authenticated");
                    println!("   Changes cannot be applied and wildcard targets cannot be expanded");
                }
                Ok((strategy, _)) => {
                    println!("✅ Credentials found");
                    println!("   Strategy: {:?}", strategy);
                }
                Err(e) => {
                    println!("❌ Authentication failed: {}", e);
                }
            }
            Ok(())
        }
    }
}

/// Write the default configuration
fn cmd_init(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Configuration already exists at {:?}. Use --force to overwrite it",
            path
        );
    }

    Config::default().save(&path)?;

    println!("✅ Configuration written to {:?}", path);
    Ok(())
}
