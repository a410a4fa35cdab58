use anyhow::Context;
use clap::Parser;
use colored::*;
use github_battle::actors::{
    spawn_battle_actor, spawn_popular_actor, BattleActorArgs, PopularActorArgs,
};
use github_battle::api::{serve, AppState};
use github_battle::cli::Cli;
use github_battle::github::{GitHubApi, GitHubClient};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("{}", "GitHub Battle".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    let client = GitHubClient::new(cli.client_config()).context("Failed to build GitHub client")?;
    if cli.github_token.is_none() {
        println!(
            "{}",
            "No GITHUB_TOKEN set, unauthenticated rate limits apply".yellow()
        );
    }
    let api: Arc<dyn GitHubApi> = Arc::new(client);

    let popular = spawn_popular_actor(PopularActorArgs {
        api: Arc::clone(&api),
        default_language: cli.default_language.clone(),
    })
    .await?;

    let battle = spawn_battle_actor(BattleActorArgs {
        api: Arc::clone(&api),
        weights: cli.weights(),
    })
    .await?;

    println!(
        "✅ Actors started (default language: {}, weights: {} per follower, {} per star)",
        cli.default_language, cli.follower_weight, cli.star_weight
    );

    let state = AppState {
        popular: popular.clone(),
        battle: battle.clone(),
        api,
        start_time: std::time::Instant::now(),
        call_timeout: cli.call_timeout(),
    };

    println!("📡 Serving on port {}", cli.port);
    println!("\nPress Ctrl+C to stop the server\n");

    tokio::select! {
        result = serve(state, cli.port) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Shutting down server...");
        }
    }

    popular.stop(None);
    battle.stop(None);
    // Give actors time to log their final state
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    info!("Server stopped");
    println!("✅ Server stopped");

    Ok(())
}
