//! Login command - exchange credentials for a stored session.

use anyhow::{Context as _, Result, bail};
use clap::Args;
use console::Style;
use serde::Serialize;
use tracing::warn;

use super::{Context, password_or_prompt, prompt};

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account name (prompted for when omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Password (prompted for when omitted)
    #[arg(short, long, env = "QUILL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginOutput {
    logged_in: bool,
    user_id: Option<i64>,
    user_name: Option<String>,
    expires_at: Option<String>,
}

/// Run the login command.
pub async fn run(args: LoginArgs, ctx: &Context) -> Result<()> {
    let name = match args.name {
        Some(name) => name,
        None => prompt("Name: ")?,
    };
    if name.is_empty() {
        bail!("No name provided, aborting.");
    }
    let password = password_or_prompt(args.password)?;

    let session = ctx
        .blog
        .login(&name, &password)
        .await
        .context("Login failed")?;

    // The login itself succeeded; a failed profile lookup only costs the name.
    let user = match ctx.blog.current_user().await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Could not fetch user profile after login");
            None
        }
    };

    let output = LoginOutput {
        logged_in: true,
        user_id: session.subject_id(),
        user_name: user.map(|u| u.name),
        expires_at: session.expires_at().map(|t| t.to_rfc3339()),
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let green = Style::new().green();
    let display_name = output.user_name.as_deref().unwrap_or(&name);
    match output.user_id {
        Some(id) => println!(
            "{} Logged in as {} (user {})",
            green.apply_to("✓"),
            display_name,
            id
        ),
        None => println!("{} Logged in as {}", green.apply_to("✓"), display_name),
    }
    if ctx.verbose
        && let Some(expires) = output.expires_at
    {
        println!("  Token expires at {expires}");
    }

    Ok(())
}
