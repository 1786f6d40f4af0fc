//! Posts command - list a user's posts page by page.

use anyhow::{Context as _, Result};
use clap::Args;
use console::{Style, style};
use quill_client::ListPostsQuery;

use super::Context;

/// Arguments for the posts command.
#[derive(Args, Debug)]
pub struct PostsArgs {
    /// Owner's user id
    pub owner: i64,

    /// Posts per page
    #[arg(short, long, default_value_t = 25)]
    pub limit: u32,

    /// Number of posts to skip
    #[arg(short, long, default_value_t = 0)]
    pub offset: u32,
}

/// Run the posts command.
pub async fn run(args: PostsArgs, ctx: &Context) -> Result<()> {
    let query = ListPostsQuery {
        limit: args.limit,
        offset: args.offset,
    };
    let page = ctx
        .blog
        .client()
        .posts()
        .list(args.owner, &query)
        .await
        .with_context(|| format!("Failed to list posts for user {}", args.owner))?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    if page.data.is_empty() {
        println!("{}", dim.apply_to("No posts."));
        return Ok(());
    }

    println!();
    for post in &page.data {
        let tags = if post.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", post.tags.join(", "))
        };
        println!(
            "  {:>5}  {}{}",
            dim.apply_to(post.id),
            style(&post.title).bold(),
            dim.apply_to(tags)
        );
    }
    println!();
    println!(
        "  {}",
        dim.apply_to(format!(
            "page {} of {}",
            page.current_page + 1,
            page.num_pages.max(1)
        ))
    );
    if page.has_next() {
        println!(
            "  {}",
            dim.apply_to(format!(
                "next: quill posts {} --limit {} --offset {}",
                args.owner,
                args.limit,
                args.offset + args.limit
            ))
        );
    }
    println!();

    Ok(())
}
