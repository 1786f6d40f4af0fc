//! Quill - command-line blog client
//!
//! Main entry point for the Quill CLI.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use quill::BlogContext;

mod commands;

use commands::{login, logout, post, posts, publish, register, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Quill - command-line blog client
#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: http://localhost:5000)
    #[arg(long, global = true, env = "QUILL_SERVER_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login(login::LoginArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Show session status
    Status(status::StatusArgs),

    /// Show one or more posts
    Post(post::PostArgs),

    /// List a user's posts
    Posts(posts::PostsArgs),

    /// Publish a post from a markdown file
    Publish(publish::PublishArgs),

    /// Create a new account
    Register(register::RegisterArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "quill=debug,quill_cache=debug,quill_client=debug,quill_session=debug,quill_config=debug,info"
    } else {
        "quill=info,quill_session=info,warn"
    };

    let log_dir = quill_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "quill.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "quill=trace,quill_cache=trace,quill_client=debug,quill_session=trace,quill_config=debug,info",
                )),
        )
        .init();

    let mut loaded = quill_config::load_config(None).context("Failed to load configuration")?;
    if let Some(server) = cli.server {
        loaded.config.server = server;
    }

    let blog = BlogContext::from_config(&loaded).context("Failed to set up client")?;

    let ctx = commands::Context {
        server_url: loaded.config.server.clone(),
        blog,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Login(args) => login::run(args, &ctx).await,
        Commands::Logout(args) => logout::run(args, &ctx).await,
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Post(args) => post::run(args, &ctx).await,
        Commands::Posts(args) => posts::run(args, &ctx).await,
        Commands::Publish(args) => publish::run(args, &ctx).await,
        Commands::Register(args) => register::run(args, &ctx).await,
    }
}
