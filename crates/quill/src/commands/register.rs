//! Register command - create a new account.

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;
use quill_client::Credentials;

use super::{Context, password_or_prompt};

/// Arguments for the register command.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account name
    #[arg(short, long)]
    pub name: String,

    /// Password (prompted for when omitted)
    #[arg(short, long, env = "QUILL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Run the register command.
pub async fn run(args: RegisterArgs, ctx: &Context) -> Result<()> {
    let password = password_or_prompt(args.password)?;
    let user = ctx
        .blog
        .client()
        .anonymous()
        .users()
        .create(&Credentials::new(&args.name, password))
        .await
        .with_context(|| format!("Failed to register {}", args.name))?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        let green = Style::new().green();
        println!(
            "{} Registered {} (user {}). Run 'quill login --name {}' to sign in.",
            green.apply_to("✓"),
            user.name,
            user.id,
            user.name
        );
    }
    Ok(())
}
