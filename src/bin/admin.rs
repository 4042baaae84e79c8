//! CLI administration tool for location-share.
//!
//! Provides commands for managing API tokens, inspecting tracked locations,
//! replaying recorded position watches, and performing database operations
//! without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a new API token
//! cargo run --bin admin -- token create
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "Production API"
//!
//! # Most recently updated locations
//! cargo run --bin admin -- locations --limit 20
//!
//! # Feed a recorded watch through the reconciler
//! printf '10.0,20.0\n10.1,20.1\n' | cargo run --bin admin -- track replay abc-123
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` parts (required): PostgreSQL connection
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server

use location_share::application::services::LocationService;
use location_share::application::services::auth_service::hash_token;
use location_share::application::tracking::{TrackingSession, run_tracking_session};
use location_share::config::Config;
use location_share::domain::clock::{Clock, SystemClock};
use location_share::domain::entities::DeviceMetadata;
use location_share::domain::identity::is_valid_device_id;
use location_share::domain::position_event::{PositionEvent, TrackStatus};
use location_share::domain::repositories::{LocationRepository, TokenRepository};
use location_share::infrastructure::persistence::{PgLocationRepository, PgTokenRepository};
use location_share::utils::time_ago::time_ago;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

/// CLI tool for managing location-share.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show the most recently updated locations
    Locations {
        /// Number of rows to show
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// Drive a tracking session from standard input
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Production API", "Dashboard")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

/// Tracking subcommands.
#[derive(Subcommand)]
enum TrackAction {
    /// Replay position events, one per line: `LAT,LNG`, `error CODE MESSAGE`
    /// or `unsupported`. Ends at EOF or Ctrl+C.
    Replay {
        /// Device id the fixes are recorded under
        device_id: String,

        /// Share link the device arrived through
        #[arg(short, long)]
        share_link: Option<String>,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Locations { limit } => list_locations(&pool, limit).await?,
        Commands::Track { action } => handle_track_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create { name, token, yes } => {
            let secret = std::env::var("TOKEN_SIGNING_SECRET")
                .context("TOKEN_SIGNING_SECRET must be set to create tokens")?;
            create_token(repo, &secret, name, token, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { name_or_id } => {
            revoke_token(repo, name_or_id).await?;
        }
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// Only the HMAC-SHA256 of the token (keyed with `TOKEN_SIGNING_SECRET`) is
/// stored. The raw token is displayed once and cannot be retrieved later.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    signing_secret: &str,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            let generated = generate_token();
            println!("{}", "✨ Generated new token".green());
            generated
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(signing_secret, &token_value);

    repo.create_token(&token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token_value.bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/locations",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<30} {:<20} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(95).bright_black());

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<3} {:<30} {:<20} {:<20} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is looked up as an ID, anything else as an exact name.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo
            .find_by_id(id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
        Err(_) => repo
            .find_by_name(&name_or_id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
    };

    let token = token.context("Token not found")?;

    if token.is_revoked() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "✅ Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Prints the most recently updated locations.
///
/// Metadata that was never captured shows as `Unknown`.
async fn list_locations(pool: &PgPool, limit: i64) -> Result<()> {
    println!("{}", "📍 Tracked Locations".bright_blue().bold());
    println!();

    let repo = PgLocationRepository::new(Arc::new(pool.clone()));
    let locations = repo
        .list(0, limit.clamp(1, 1000))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list locations: {}", e))?;

    if locations.is_empty() {
        println!("{}", "  No locations recorded yet".yellow());
        return Ok(());
    }

    let now = SystemClock.now_millis();

    println!(
        "  {:<38} {:<24} {:<16} {:<8} {:<16} {}",
        "Device".bright_white().bold(),
        "Position".bright_white().bold(),
        "IP".bright_white().bold(),
        "Type".bright_white().bold(),
        "Nickname".bright_white().bold(),
        "Updated".bright_white().bold()
    );
    println!("  {}", "─".repeat(120).bright_black());

    for location in &locations {
        let position = format!("{:.5}, {:.5}", location.latitude, location.longitude);
        let nickname = if location.nickname.is_empty() {
            "-"
        } else {
            location.nickname.as_str()
        };

        println!(
            "  {:<38} {:<24} {:<16} {:<8} {:<16} {}",
            location.device_id.cyan(),
            position,
            or_unknown(location.ip.as_deref()),
            or_unknown(location.device_type.as_deref()),
            nickname,
            time_ago(location.updated_at, now).bright_black()
        );
    }

    println!();

    Ok(())
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("Unknown")
}

/// Dispatches tracking commands.
async fn handle_track_action(action: TrackAction, pool: &PgPool) -> Result<()> {
    match action {
        TrackAction::Replay {
            device_id,
            share_link,
        } => replay_track(pool, device_id, share_link).await,
    }
}

/// Runs a tracking session whose position watch is standard input.
///
/// Every status the tracking view would show is printed as it changes.
/// Unparseable lines are reported and skipped.
async fn replay_track(pool: &PgPool, device_id: String, share_link: Option<String>) -> Result<()> {
    anyhow::ensure!(
        is_valid_device_id(&device_id),
        "Device id must be 1-128 characters of letters, digits, '-' or '_'"
    );

    println!("{}", "🛰️  Replaying position watch".bright_blue().bold());
    println!("  Device: {}", device_id.cyan());
    println!();

    let repo: Arc<dyn LocationRepository> = Arc::new(PgLocationRepository::new(Arc::new(pool.clone())));
    let service = Arc::new(LocationService::new(repo, Arc::new(SystemClock)));
    let metadata = DeviceMetadata {
        share_link_id: share_link,
        ..Default::default()
    };
    let session = TrackingSession::new(service.clone(), device_id.clone(), metadata);

    let (events_tx, events_rx) = mpsc::channel::<PositionEvent>(16);
    let (status_tx, mut status_rx) = watch::channel(TrackStatus::Fetching);
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let runner = tokio::spawn(run_tracking_session(session, events_rx, status_tx, cancel_rx));

    let printer = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().to_string();
            println!("  {}", status.bright_white());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read standard input")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<PositionEvent>() {
                    Ok(event) => {
                        if events_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("  {}", e.to_string().yellow()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                cancel_tx.send_replace(true);
                break;
            }
        }
    }

    drop(events_tx);
    runner.await.context("Tracking session panicked")?;
    printer.await.context("Status printer panicked")?;

    println!();
    match service
        .find(&device_id)
        .await
        .context("Failed to load the stored record")?
    {
        Some(location) => {
            println!("{}", "✅ Stored record".green().bold());
            println!(
                "  Position:   {:.6}, {:.6}",
                location.latitude, location.longitude
            );
            println!(
                "  Created at: {}",
                location
                    .created_at
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "Unknown".to_string())
            );
            println!("  Updated at: {}", location.updated_at);
        }
        None => println!("{}", "⚠️  No record stored for this device".yellow()),
    }
    println!();

    Ok(())
}

/// Displays system statistics.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let locations_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
        .fetch_one(pool)
        .await?;

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM share_links")
        .fetch_one(pool)
        .await?;

    let short_urls_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM share_links WHERE short_code IS NOT NULL")
            .fetch_one(pool)
            .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Locations:     {}",
        locations_count.to_string().bright_green().bold()
    );
    println!(
        "  Share links:   {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Short URLs:    {}",
        short_urls_count.to_string().bright_green().bold()
    );
    println!(
        "  Active tokens: {}",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a cryptographically random token.
///
/// 48 characters from A-Z, a-z, 0-9 (~286 bits of entropy).
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
