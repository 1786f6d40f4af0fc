//! Logout command.

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

/// Arguments for the logout command.
#[derive(Args, Debug)]
pub struct LogoutArgs {}

/// Run the logout command.
pub async fn run(_args: LogoutArgs, ctx: &Context) -> Result<()> {
    let was_logged_in = ctx.blog.session().is_logged_in();
    ctx.blog.logout().context("Failed to remove stored token")?;

    if ctx.json_output {
        println!("{}", serde_json::json!({ "logged_out": was_logged_in }));
    } else if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
