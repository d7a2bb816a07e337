use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use console::identity::IdentityStore;
use console::state_store::StateStore;
use console::{cli, create_termination};

const DEFAULT_SERVER: &str = "127.0.0.1:8000";
const DEFAULT_IDENTITY_FILE: &str = ".meetbot_username";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logs go to stderr so they do not interleave with the CLI output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let server = std::env::var("MEETBOT_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_string());
    // the encrypted transport variant, for when the agent sits behind TLS
    let secure = std::env::var("MEETBOT_TLS").map(|v| v == "1").unwrap_or(false);
    let scheme = if secure { "wss" } else { "ws" };
    let url = format!("{}://{}/ws", scheme, server);

    let identity_path = std::env::var("MEETBOT_IDENTITY_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_IDENTITY_FILE));

    let (terminator, interrupt_rx) = create_termination();
    let (state_store, state_rx, notice_rx, progress_rx) = StateStore::new();
    let (action_tx, action_rx) = mpsc::unbounded_channel();

    tokio::try_join!(
        state_store.main_loop(
            url,
            IdentityStore::new(identity_path),
            terminator,
            action_rx,
            interrupt_rx.resubscribe(),
        ),
        cli::main_loop(
            interrupt_rx.resubscribe(),
            action_tx,
            state_rx,
            notice_rx,
            progress_rx,
        ),
    )?;

    Ok(())
}
