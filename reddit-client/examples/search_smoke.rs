//! Live check against Reddit: `REDDIT_CLIENT_ID=.. REDDIT_CLIENT_SECRET=.. cargo run -p reddit-client --example search_smoke -- sailing ePropulsion`
use brandpulse_core::{ErrorExt, RedditCredentials};
use reddit_client::{RedditClient, RedditClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("reddit_client=debug").init();

    let mut args = std::env::args().skip(1);
    let subreddit = args.next().unwrap_or_else(|| "sailing".to_string());
    let query = args.next().unwrap_or_else(|| "ePropulsion".to_string());

    let credentials = RedditCredentials::from_env()?;
    let config = RedditClientConfig::new(credentials, "brandpulse/0.1 smoke test".to_string())?;
    let client = RedditClient::new(config)?;

    if let Err(e) = client.authenticate().await {
        println!("Authentication failed: {}", e.user_friendly_message());
        return Ok(());
    }

    let posts = client.search_posts(&subreddit, &query, 25).await?;
    println!("{} results for '{}' in r/{}", posts.len(), query, subreddit);
    for post in posts.iter().take(10) {
        println!(
            "  [{}] {} ({} points, {} comments)",
            post.id,
            post.title.as_deref().unwrap_or("<untitled>"),
            post.score,
            post.num_comments
        );
    }

    client.log_api_metrics().await;
    Ok(())
}
