//! Publish command - submit a markdown file as a new post.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use console::Style;
use quill_client::CreatePostRequest;

use super::Context;

/// Arguments for the publish command.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Owner's user id
    pub owner: i64,

    /// Post title
    #[arg(short, long)]
    pub title: String,

    /// Markdown file with the post body (`-` for stdin)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Tag to attach (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Run the publish command.
pub async fn run(args: PublishArgs, ctx: &Context) -> Result<()> {
    let client = ctx.blog.client();
    if !client.is_authenticated() {
        bail!("Not logged in. Run 'quill login' first.");
    }

    let content = read_body(&args.file)?;
    if content.trim().is_empty() {
        bail!("Post body is empty");
    }

    let request = CreatePostRequest::new(args.owner, args.title, content).with_tags(args.tags);
    let post = client
        .posts()
        .create(args.owner, &request)
        .await
        .context("Failed to publish post")?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&post)?);
    } else {
        let green = Style::new().green();
        println!(
            "{} Published \"{}\" as post {}/{}",
            green.apply_to("✓"),
            post.title,
            post.owner_id,
            post.id
        );
    }
    Ok(())
}

fn read_body(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read post body from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
