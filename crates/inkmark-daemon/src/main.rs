use clap::Parser;
use inkmark_client::{ChangeFeed, ClientConfig, HttpFeed, RestStore, StoreGateway};
use inkmark_core::{Session, SessionOptions};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "inkmark-daemon")]
#[command(about = "Inkmark bookmark sync console")]
struct Cli {
    /// Base URL of the bookmark store REST surface
    #[arg(long, env = "INKMARK_STORE_URL")]
    store_url: String,

    /// Project api key
    #[arg(long, env = "INKMARK_API_KEY")]
    api_key: String,

    /// Per-user bearer token
    #[arg(long, env = "INKMARK_TOKEN")]
    token: String,

    /// User the session is scoped to
    #[arg(long, env = "INKMARK_USER_ID")]
    user_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    info!("=== Inkmark Daemon [crate: inkmark-daemon] ===");
    info!("Role: Bookmark Sync & Reconciliation Node");

    let config = ClientConfig::new(&cli.store_url, &cli.api_key, &cli.token);
    let store: Arc<dyn StoreGateway> = Arc::new(RestStore::new(config.clone())?);
    let feed: Arc<dyn ChangeFeed> = Arc::new(HttpFeed::new(config)?);

    let snapshot = store.list_by_owner(&cli.user_id).await?;
    info!("Loaded {} bookmarks for {}", snapshot.len(), cli.user_id);

    let session = Session::initialize(
        SessionOptions {
            user_id: cli.user_id.clone(),
        },
        snapshot,
        store,
        feed,
    )
    .await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = run_console(&session) => {}
    }

    session.teardown();
    Ok(())
}

async fn run_console(session: &Session) {
    use tokio::io::{self, AsyncBufReadExt, BufReader};
    let mut reader = BufReader::new(io::stdin()).lines();

    println!("\n[Inkmark CONSOLE] Ready for commands.");
    println!("Available: add <url> [title]   rm <id>   ls   status   quit");

    while let Ok(Some(line)) = reader.next_line().await {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "add" if parts.len() >= 2 => {
                let title = if parts.len() > 2 {
                    Some(parts[2..].join(" "))
                } else {
                    None
                };
                match session.request_add(parts[1], title.as_deref()).await {
                    Ok(record) => println!("[Inkmark] saved {} as {}", record.url, record.id),
                    Err(e) => println!("[Inkmark] add failed: {}", e),
                }
            }
            "rm" if parts.len() >= 2 => {
                session.request_delete(parts[1]).await;
                println!("[Inkmark] delete requested for {}", parts[1]);
            }
            "ls" => {
                let rows = session.bookmarks();
                if rows.is_empty() {
                    println!("[Inkmark] no bookmarks yet");
                }
                for row in rows {
                    println!(
                        "  {}  {}  {}",
                        row.id,
                        row.created_at.format("%Y-%m-%d %H:%M"),
                        row.title.as_deref().unwrap_or(&row.url)
                    );
                }
            }
            "status" => {
                println!("[Inkmark] feed: {:?}", session.connection_state());
            }
            "quit" | "exit" => break,
            _ => {
                println!(
                    "[Inkmark] Unknown command: {}. Try 'add', 'rm', 'ls', 'status'.",
                    parts[0]
                );
            }
        }
    }
}
