//! Quickstart - Essential comment operations
//!
//! Covers: posting, replying, finding, counting, callback delivery
//!
//! Run: cargo run --example quickstart
//!
//! Set environment variables to point at your server:
//!   COMMENTS_ORIGIN=http://localhost:8080
//!   COMMENTS_PATH=/api/comments

use comment_kit::*;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("comment_kit=debug")),
        )
        .init();

    let comments = Comments::from_env()?;
    println!("Using {}", comments.path());

    // Post a comment on an article, then reply to it
    let created = comments
        .comment("Great article!")
        .by("alice")?
        .on("article-7")?
        .fire()?
        .await?;
    println!("Created: {created}");

    if let Some(id) = created.get("id").and_then(|v| v.as_u64()) {
        comments
            .reply("Thanks!")
            .by("bob")?
            .on("article-7")?
            .to(id)
            .fire()?
            .await?;
    }

    // Root comments with their replies
    let thread = comments.find_root_all(true).on("article-7")?.fire()?.await?;
    println!("Thread: {thread}");

    // The latest comment by alice
    let latest = comments.find(false).by("alice")?.fire()?.await?;
    println!("Alice's latest: {latest}");

    // Callback delivery
    let (tx, rx) = tokio::sync::oneshot::channel();
    comments.count().fire_with(move |outcome| {
        let _ = tx.send(outcome);
    })?;
    println!("Total comments: {}", rx.await.map_err(|_| TransportError::Dropped)??);

    Ok(())
}
