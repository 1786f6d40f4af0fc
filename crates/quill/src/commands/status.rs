//! Status command - shows the current session.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use tracing::warn;

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Status response for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    server_url: String,
    logged_in: bool,
    user_id: Option<i64>,
    user_name: Option<String>,
    expires_at: Option<String>,
    expired: bool,
    token_path: String,
}

/// Run the status command.
pub async fn run(_args: StatusArgs, ctx: &Context) -> Result<()> {
    let manager = ctx.blog.session();
    let session = manager.session();
    let user = match ctx.blog.current_user().await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Could not fetch user profile");
            None
        }
    };

    let output = StatusOutput {
        server_url: ctx.server_url.clone(),
        logged_in: manager.is_logged_in(),
        user_id: session.as_ref().and_then(|s| s.subject_id()),
        user_name: user.map(|u| u.name),
        expires_at: session
            .as_ref()
            .and_then(|s| s.expires_at())
            .map(|t| t.to_rfc3339()),
        expired: session.as_ref().is_some_and(|s| s.is_expired()),
        token_path: manager.store().path().display().to_string(),
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let red = Style::new().red();
    let yellow = Style::new().yellow();
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Quill Session").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();
    println!("  {} {}", dim.apply_to("Server:"), output.server_url);

    match (&session, output.logged_in) {
        (Some(_), _) => {
            let state = if output.expired {
                yellow.apply_to("● logged in (token expired)")
            } else {
                green.apply_to("● logged in")
            };
            println!("  {} {}", dim.apply_to("Status:"), state);
            match (&output.user_name, output.user_id) {
                (Some(name), Some(id)) => {
                    println!("  {} {} (id {})", dim.apply_to("User:"), name, id)
                }
                (None, Some(id)) => println!("  {} {}", dim.apply_to("User:"), id),
                _ => {}
            }
            if let Some(expires) = &output.expires_at {
                println!("  {} {}", dim.apply_to("Expires:"), expires);
            }
        }
        (None, true) => {
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                red.apply_to("● stored token is unreadable")
            );
            println!();
            println!("  Run 'quill logout' then 'quill login' to start over.");
        }
        (None, false) => {
            println!("  {} {}", dim.apply_to("Status:"), red.apply_to("○ logged out"));
        }
    }

    if ctx.verbose {
        println!("  {} {}", dim.apply_to("Token:"), output.token_path);
    }
    println!();

    Ok(())
}
