#![cfg_attr(not(test), forbid(unsafe_code))]

//! Main entry point for the `RecipeBox` CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{FileTokenStorage, RecipeApiClient, SessionStore};
use dotenv::dotenv;
use shared::config::client::{ClientConfig, ConfigFormat};

mod commands;
mod logging;

/// `RecipeBox` CLI
#[derive(Parser, Debug)]
#[command(name = "recipebox")]
#[command(about = "Command-line client for RecipeBox", long_about = None)]
pub struct Cli {
    /// Path to a configuration file (yaml, json or toml)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the API, including the `/api` prefix
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for the `RecipeBox` CLI
#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Api(ApiCommands),

    /// Generate a configuration file with default values
    Config {
        /// Format of the configuration file
        #[arg(long, short, default_value = "yaml")]
        format: ConfigFormat,

        /// Where to write the file. Defaults to `recipebox.<format>` in the current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell to generate the completion script for
        #[arg(long, short)]
        shell: clap_complete::Shell,
    },
}

/// Subcommands that talk to the API through a session store.
#[derive(Subcommand, Debug)]
pub enum ApiCommands {
    /// Sign in with email and password
    Login(commands::session::LoginArgs),

    /// Create an account and sign in
    Register(commands::session::RegisterArgs),

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List every recipe
    Recipes,

    /// List recipes saved by the signed-in user
    Saved,

    /// Publish a new recipe
    Add(commands::recipes::AddArgs),

    /// Show one recipe
    Show {
        /// Recipe identifier
        id: String,
    },

    /// Save a recipe to your collection
    Save {
        /// Recipe identifier
        id: String,
    },
}

/// Build the session store every command shares.
fn session_store(config: &ClientConfig) -> Result<SessionStore> {
    let api = RecipeApiClient::from_config(config).context("failed to build API client")?;
    let storage = FileTokenStorage::new(config.resolved_token_path());
    Ok(SessionStore::with_storage(api, storage))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config { format, output } => commands::config::generate_config(format, output),
        Commands::Completion { shell } => {
            commands::completion::generate_completion(shell);
            Ok(())
        }
        Commands::Api(command) => {
            let config = ClientConfig::load_config(cli.config.as_deref(), cli.api_url.as_deref())
                .context("failed to load configuration")?;
            logging::initialize_tracing(&config);

            let store = session_store(&config)?;
            store.restore().await;
            dispatch(&store, command).await
        }
    }
}

async fn dispatch(store: &SessionStore, command: ApiCommands) -> Result<()> {
    match command {
        ApiCommands::Login(args) => commands::session::login(store, args).await,
        ApiCommands::Register(args) => commands::session::register(store, args).await,
        ApiCommands::Logout => {
            commands::session::logout(store);
            Ok(())
        }
        ApiCommands::Whoami => {
            commands::session::whoami(store);
            Ok(())
        }
        ApiCommands::Recipes => commands::recipes::list(store).await,
        ApiCommands::Saved => commands::recipes::saved(store),
        ApiCommands::Add(args) => commands::recipes::add(store, args).await,
        ApiCommands::Show { id } => commands::recipes::show(store, &id).await,
        ApiCommands::Save { id } => commands::recipes::save(store, &id).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    run(Cli::parse()).await
}
