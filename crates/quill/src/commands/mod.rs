//! CLI command handlers.

pub mod login;
pub mod logout;
pub mod post;
pub mod posts;
pub mod publish;
pub mod register;
pub mod status;

use std::io::Write;

use anyhow::Result;
use quill::BlogContext;
use quill_client::Post;

/// Shared context for all commands.
pub struct Context {
    /// Server URL in effect.
    pub server_url: String,
    /// Session and post cache.
    pub blog: BlogContext,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Read one line from stdin after printing `label`.
pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Use `value` if given, otherwise ask for a password without echo.
pub(crate) fn password_or_prompt(value: Option<String>) -> Result<String> {
    match value {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}

/// Print a post in the human-readable layout.
pub(crate) fn print_post(post: &Post) {
    use console::{Style, style};

    let dim = Style::new().dim();
    println!("{}", style(&post.title).bold());

    let mut meta = format!("#{} by user {}", post.id, post.owner_id);
    if let Some(created) = post.created_on {
        meta.push_str(&format!(" · {}", created.format("%Y-%m-%d %H:%M")));
    }
    if !post.tags.is_empty() {
        meta.push_str(&format!(" · {}", post.tags.join(", ")));
    }
    println!("{}", dim.apply_to(meta));
    println!("{}", dim.apply_to("─".repeat(40)));
    println!("{}", post.content);
}
