pub mod agent;
pub mod attachment;
pub mod cli;
pub mod error;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;
pub mod websocket;

use cli::Args;
use history::SnapshotStore;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Chat API Key Set: {}", !args.chat_api_key.is_empty());
    info!("Chat Timeout (s): {}", args.chat_timeout_secs);
    info!("State Path: {}", args.state_path.as_deref().unwrap_or("(memory only)"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let chat_client = llm::chat::new_client(&args.llm_config())?;
    info!(
        "Chat client configured: Model={}, BaseURL={:?}",
        chat_client.get_model(),
        chat_client.get_base_url()
    );
    let snapshot = args.state_path.as_deref().map(SnapshotStore::new);

    let server = Server::new(args, chat_client, snapshot);
    server.run().await?;

    Ok(())
}
