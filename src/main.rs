mod api;
mod auth;
mod commands;
mod config;
mod models;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use auth::AuthClient;
use config::Config;

/// Command-line client for the property listing backend
#[derive(Parser)]
#[command(name = "proplist", version, about)]
struct Cli {
    /// Backend base URL (default http://localhost:3000, env PROPLIST_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Register(commands::RegisterArgs),
    /// Log in and store the bearer token
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show who is logged in
    Whoami,
    /// Search listings with filters
    Search(commands::SearchArgs),
    /// List a new property
    Create(commands::ListingArgs),
    /// Replace a listing you own
    Update {
        /// Listing id
        id: String,
        #[command(flatten)]
        args: commands::ListingArgs,
    },
    /// Delete a listing you own
    Delete {
        /// Listing id
        id: String,
    },
    /// Show your own listings
    Mine {
        /// Print the raw listing array as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage saved properties
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Recommend a listing to another user by email
    Recommend {
        /// Listing id
        property_id: String,
        /// Recipient email
        email: String,
    },
    /// Show listings recommended to you
    Recommendations {
        /// Print the raw listing array as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// Show saved properties
    List {
        /// Print the raw listing array as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a property
    Add {
        /// Listing id
        property_id: String,
    },
    /// Remove a saved property
    Remove {
        /// Listing id
        property_id: String,
    },
}

/// Login guard plus client construction for the protected commands.
fn authed_api(config: &Config, auth: &AuthClient) -> Result<ApiClient> {
    let user = commands::require_login(auth)?;
    ApiClient::new(config, Some(user.token))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.api_url)?;
    let auth = AuthClient::new(&config)?;

    match cli.command {
        Command::Register(args) => commands::register(&auth, args).await,
        Command::Login { email, password } => commands::login(&auth, &email, &password).await,
        Command::Logout => commands::logout(&auth),
        Command::Whoami => commands::whoami(&auth),
        Command::Search(args) => {
            commands::search(&authed_api(&config, &auth)?, args).await
        }
        Command::Create(args) => {
            commands::create(&authed_api(&config, &auth)?, args).await
        }
        Command::Update { id, args } => {
            commands::update(&authed_api(&config, &auth)?, &id, args).await
        }
        Command::Delete { id } => {
            commands::delete(&authed_api(&config, &auth)?, &id).await
        }
        Command::Mine { json } => {
            commands::mine(&authed_api(&config, &auth)?, json).await
        }
        Command::Favorites { action } => {
            let api = authed_api(&config, &auth)?;
            match action {
                FavoritesAction::List { json } => commands::favorites_list(&api, json).await,
                FavoritesAction::Add { property_id } => {
                    commands::favorite_add(&api, &property_id).await
                }
                FavoritesAction::Remove { property_id } => {
                    commands::favorite_remove(&api, &property_id).await
                }
            }
        }
        Command::Recommend { property_id, email } => {
            commands::recommend(&authed_api(&config, &auth)?, &property_id, &email).await
        }
        Command::Recommendations { json } => {
            commands::recommendations(&authed_api(&config, &auth)?, json).await
        }
    }
}
