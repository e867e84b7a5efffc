//! CLI administration tool for qr-shortener.
//!
//! Works directly against the PostgreSQL store, without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL (prompts for it if omitted)
//! cargo run --bin admin -- shorten https://example.com --level H --size 512
//!
//! # Show a stored short URL
//! cargo run --bin admin -- show aZ3kP9
//!
//! # Save its QR code as a PNG file
//! cargo run --bin admin -- qr aZ3kP9 --output aZ3kP9.png
//!
//! # Check database connection / apply migrations
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db migrate
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; `DATABASE_URL` (or the `DB_*` components) is required.

use qr_shortener::application::services::{ShortenerService, ShortenerSettings};
use qr_shortener::config::{self, Config, mask_connection_string};
use qr_shortener::domain::entities::QrOptions;
use qr_shortener::infrastructure::cache::NullCache;
use qr_shortener::infrastructure::persistence::PgUrlRepository;
use qr_shortener::server::connect_pool;
use qr_shortener::utils::code_generator::RandomCodeGenerator;
use qr_shortener::utils::qr_encoder::QrEncoder;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI tool for managing qr-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short URL
    Shorten {
        /// URL to shorten (prompted for if omitted)
        url: Option<String>,

        /// QR error correction level: L, M, Q or H
        #[arg(short, long)]
        level: Option<String>,

        /// QR image size in pixels (128-1024)
        #[arg(short, long)]
        size: Option<u32>,
    },

    /// Show a stored short URL
    Show {
        /// Short code
        code: String,
    },

    /// Write the QR code of a short URL to a PNG file
    Qr {
        /// Short code
        code: String,

        /// Override the stored error correction level
        #[arg(short, long)]
        level: Option<String>,

        /// Override the stored image size
        #[arg(short, long)]
        size: Option<u32>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,

    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL (or DB_HOST/DB_USER/DB_PASSWORD/DB_NAME) must be set")?;

    let pool = connect_pool(&config, &database_url).await?;

    match cli.command {
        Commands::Shorten { url, level, size } => {
            shorten(&service(&config, &pool), url, level, size).await?
        }
        Commands::Show { code } => show(&service(&config, &pool), &code).await?,
        Commands::Qr {
            code,
            level,
            size,
            output,
        } => write_qr(&service(&config, &pool), &code, level, size, output).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &database_url).await?,
    }

    Ok(())
}

/// Builds a shortener service over the PostgreSQL store without caching.
fn service(config: &Config, pool: &PgPool) -> ShortenerService {
    ShortenerService::new(
        Arc::new(PgUrlRepository::new(Arc::new(pool.clone()))),
        Arc::new(RandomCodeGenerator::new(config.short_code_length)),
        Arc::new(NullCache::new()),
        ShortenerSettings {
            base_url: config.base_url.clone(),
            max_code_attempts: config.max_code_attempts,
            cache_ttl_seconds: None,
        },
    )
}

/// Creates a short URL, prompting for the target if none was given.
async fn shorten(
    service: &ShortenerService,
    url: Option<String>,
    level: Option<String>,
    size: Option<u32>,
) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("URL to shorten")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let created = service
        .create(&url, level.as_deref(), size)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    println!("{}", "✅ Short URL created".green().bold());
    println!();
    println!("  Code:      {}", created.record.short_code.as_str().cyan());
    println!("  Short URL: {}", created.short_url.bright_yellow().bold());
    println!("  Target:    {}", created.record.original_url);
    println!(
        "  QR:        level {}, {} px",
        created.record.qr_error_correction, created.record.qr_size
    );
    println!();
    println!(
        "  Save the QR code with: {} admin -- qr {} --output qr.png",
        "cargo run --bin".bright_cyan(),
        created.record.short_code
    );
    println!();

    Ok(())
}

/// Prints a stored short URL.
async fn show(service: &ShortenerService, code: &str) -> Result<()> {
    let record = service
        .resolve(code)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

    println!("{}", "📋 Short URL".bright_blue().bold());
    println!();
    println!("  Code:      {}", record.short_code.as_str().cyan());
    println!(
        "  Short URL: {}",
        service.short_url(&record.short_code).bright_yellow()
    );
    println!("  Target:    {}", record.original_url);
    println!(
        "  QR:        level {}, {} px",
        record.qr_error_correction, record.qr_size
    );
    println!(
        "  Created:   {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Renders the QR code of a stored short URL into a PNG file.
async fn write_qr(
    service: &ShortenerService,
    code: &str,
    level: Option<String>,
    size: Option<u32>,
    output: PathBuf,
) -> Result<()> {
    let record = service
        .resolve(code)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

    let options = QrOptions::resolve(level.as_deref(), size, record.qr_options())
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let short_url = service.short_url(&record.short_code);

    let png = QrEncoder::new()
        .encode(&short_url, options)
        .map_err(|e| anyhow::anyhow!("Failed to render QR code: {}", e))?;

    std::fs::write(&output, &png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} ({}, level {}, {} px)",
        "✅ Wrote".green().bold(),
        output.display().to_string().cyan(),
        short_url,
        options.error_correction,
        options.size
    );

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, database_url: &str) -> Result<()> {
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

            let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  Database:   {}", mask_connection_string(database_url));
            println!("  PostgreSQL: {}", version.bright_white());
            println!(
                "  Short URLs: {}",
                records.to_string().bright_green().bold()
            );
            println!();
        }
        DbAction::Migrate => {
            println!("{}", "🛠  Applying migrations...".bright_blue());

            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .context("Migration failed")?;

            println!("{}", "✅ Migrations applied".green().bold());
        }
    }

    Ok(())
}
