//! `vcu-server`: the canned-reply endpoint's process entry point (spec.md
//! §4.6). Loads the same `comm_config.toml` shape as the client binary
//! (see [`EndpointConfig::from_map_server`] for how the local/remote roles
//! swap) plus a `response_message_body.json` canned-reply fixture, binds
//! one UDP socket, and runs the dialog loop until killed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::UdpSocket;

use vcu_common::config::EndpointConfig;
use vcu_rtp::audio::{NullAudioSink, SilentAudioSource};
use vcu_server::dialog::ServerDialog;
use vcu_server::fixtures::CannedReplyStore;
use vcu_server::listener::run_server_loop;

#[derive(Parser, Debug)]
#[command(author, version, about = "VCU radio-dispatch SIP/RTP server", long_about = None)]
struct Cli {
    /// Path to the `comm_config.toml` endpoint configuration.
    #[arg(short, long, default_value = "comm_config.toml")]
    config: PathBuf,

    /// Path to the canned-reply JSON fixture (spec.md §6).
    #[arg(short, long, default_value = "response_message_body.json")]
    fixtures: PathBuf,

    /// The seat/channel identity this endpoint answers as.
    #[arg(short, long, default_value = "base")]
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    vcu_common::logging::init_tracing("vcu_server=info,vcu_sip=info,vcu_rtp=info,warn");

    let cli = Cli::parse();
    let config = EndpointConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let replies = CannedReplyStore::from_file(&cli.fixtures)
        .with_context(|| format!("loading {}", cli.fixtures.display()))?;

    let socket = Arc::new(
        UdpSocket::bind((config.local_ip, config.local_port))
            .await
            .with_context(|| format!("binding {}:{}", config.local_ip, config.local_port))?,
    );

    let dialog = Arc::new(ServerDialog::new(
        config,
        replies,
        Arc::new(|| Box::new(SilentAudioSource)),
        Arc::new(|| Box::new(NullAudioSink)),
    ));

    tracing::info!(user = %cli.user, "VCU server listening");
    run_server_loop(dialog, socket).await;
    Ok(())
}
