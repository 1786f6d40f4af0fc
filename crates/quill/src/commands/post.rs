//! Post command - fetch posts through the shared cache.

use anyhow::{Result, bail};
use clap::Args;
use console::Style;
use futures::future::join_all;
use quill::PostKey;

use super::{Context, print_post};

/// Arguments for the post command.
#[derive(Args, Debug)]
pub struct PostArgs {
    /// Owner's user id
    pub owner: i64,

    /// Post ids; repeated ids share a single request
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<i64>,
}

/// Run the post command.
pub async fn run(args: PostArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.blog.posts();
    let loads = args
        .ids
        .iter()
        .map(|&id| cache.load(PostKey::new(args.owner, id)));
    let results = join_all(loads).await;

    let mut failed = 0;
    if ctx.json_output {
        let rendered: Vec<_> = results
            .iter()
            .zip(&args.ids)
            .map(|(result, id)| match result {
                Ok(post) => serde_json::json!({ "id": id, "post": &**post }),
                Err(e) => {
                    failed += 1;
                    serde_json::json!({ "id": id, "error": e.to_string() })
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        let red = Style::new().red();
        for (i, (result, id)) in results.iter().zip(&args.ids).enumerate() {
            if i > 0 {
                println!();
            }
            match result {
                Ok(post) => print_post(post),
                Err(e) => {
                    failed += 1;
                    eprintln!("{} post {}/{}: {}", red.apply_to("✗"), args.owner, id, e);
                }
            }
        }
    }

    if ctx.verbose {
        let stats = cache.stats();
        eprintln!(
            "cache: {} requests, {} fetches, {} coalesced, {} hits",
            args.ids.len(),
            stats.fetches,
            stats.coalesced,
            stats.hits
        );
    }

    if failed > 0 {
        bail!("{} of {} posts could not be loaded", failed, args.ids.len());
    }
    Ok(())
}
