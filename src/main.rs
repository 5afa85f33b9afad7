use anyhow::{Context, Result};
use bt_bootstrap::commands;
use tracing::info;

mod cli;

// Usage: bt-bootstrap <decode|info|peers|handshake> ...
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = args.config()?;

    info!("Command: {:?}", args.command);

    match &args.command {
        cli::Command::Decode { input } => {
            let decoded = commands::decode(input.as_bytes(), &config)
                .with_context(|| format!("failed to decode {:?}", input))?;
            println!("{}", decoded);
        }
        cli::Command::Info { path } => {
            let (torrent, _) = commands::info(path, &config)
                .with_context(|| format!("failed to read torrent {}", path.display()))?;
            print!("{}", torrent);
        }
        cli::Command::Peers { path } => {
            let peers = commands::peers(path, &config)
                .with_context(|| format!("failed to get peers for {}", path.display()))?;
            for peer in peers {
                println!("{}", peer);
            }
        }
        cli::Command::Handshake { path, peer } => {
            let peer_id = commands::handshake(path, peer, &config)
                .with_context(|| format!("handshake with {} failed", peer))?;
            println!("Peer ID: {}", hex::encode(peer_id));
        }
    }

    Ok(())
}
