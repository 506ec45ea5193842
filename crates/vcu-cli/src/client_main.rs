//! `vcu-client`: drives one client-side dispatch console session against
//! a configured server peer, spawning the receive loop (spec.md §6
//! "a start action") and executing whichever action subcommand was given.
//!
//! This binary is the external collaborator seam spec.md §1 calls out —
//! the terminal/graphical front-end and audio device discovery live
//! outside `vcu-client`/`vcu-rtp`; this process just wires config, a UDP
//! socket, and a headless audio pair together the way a real console
//! would wire in its terminal UI and sound card.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::UdpSocket;

use vcu_client::dispatcher::Dispatcher;
use vcu_client::receive::run_receive_loop;
use vcu_common::config::EndpointConfig;
use vcu_rtp::audio::{NullAudioSink, SilentAudioSource};

#[derive(Parser, Debug)]
#[command(author, version, about = "VCU radio-dispatch SIP/RTP client", long_about = None)]
struct Cli {
    /// Path to the `comm_config.toml` endpoint configuration.
    #[arg(short, long, default_value = "comm_config.toml")]
    config: PathBuf,

    /// How long to wait for the action's response before printing state
    /// and exiting (the single-in-flight slot has no blocking "wait for
    /// completion" call of its own — spec.md §5 leaves that to the
    /// caller observing state).
    #[arg(long, default_value = "2")]
    settle_secs: u64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Send the REGISTER request and report the parsed role info.
    Register,
    /// Send the INFO keep-alive (`vcu_login`/`vcu_logout` by current status).
    KeepAlive,
    /// Fetch the phone button catalog.
    GetPhoneBtn,
    /// Fetch the frequency button catalog.
    GetFrequencyBtn,
    /// Fetch the radio button catalog.
    GetRadioBtn,
    /// Fetch the function button catalog.
    GetFunctionBtn,
    /// Fetch the full frequency catalog via `all_freq`.
    GetAllFrequencyBtn,
    /// Select (transmit/receive) a radio by its code.
    SelectRadio { code: String },
    /// Release a held radio by its code.
    Bye { code: String },
    /// Push-to-talk key-up placeholder (spec.md §6); currently a no-op.
    KeyUp,
}

#[tokio::main]
async fn main() -> Result<()> {
    vcu_common::logging::init_tracing("vcu_client=info,vcu_sip=info,vcu_rtp=info,warn");

    let cli = Cli::parse();
    let config = EndpointConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let socket = Arc::new(
        UdpSocket::bind((config.local_ip, config.local_port))
            .await
            .with_context(|| format!("binding {}:{}", config.local_ip, config.local_port))?,
    );

    let dispatcher = Arc::new(Dispatcher::new(
        config,
        socket.clone(),
        Arc::new(|| Box::new(SilentAudioSource)),
        Arc::new(|| Box::new(NullAudioSink)),
    ));

    let receive_handle = tokio::spawn(run_receive_loop(dispatcher.clone(), socket));

    run_action(&dispatcher, cli.action).await?;

    tokio::time::sleep(Duration::from_secs(cli.settle_secs)).await;
    print_state(&dispatcher);

    receive_handle.abort();
    Ok(())
}

async fn run_action(dispatcher: &Dispatcher, action: Action) -> Result<()> {
    match action {
        Action::Register => dispatcher.register().await?,
        Action::KeepAlive => dispatcher.keep_alive().await?,
        Action::GetPhoneBtn => dispatcher.get_phone_btn().await?,
        Action::GetFrequencyBtn => dispatcher.get_frequency_btn().await?,
        Action::GetRadioBtn => dispatcher.get_radio_btn().await?,
        Action::GetFunctionBtn => dispatcher.get_function_btn().await?,
        Action::GetAllFrequencyBtn => dispatcher.get_all_frequency_btn().await?,
        Action::SelectRadio { code } => dispatcher.select_radio(&code).await?,
        Action::Bye { code } => dispatcher.bye(&code).await?,
        Action::KeyUp => dispatcher.key_up(),
    }
    Ok(())
}

fn print_state(dispatcher: &Dispatcher) {
    let shared = dispatcher.shared().lock();
    println!("status: {:?}", shared.status);
    println!("selected_role: {:?}", shared.selected_role);
    println!("channel_list: {:?}", shared.channel_list);
    println!("send_radio: {:?}", shared.send_radio);
    println!("recv_radio: {:?}", shared.recv_radio);
    println!("frequency_list: {} entries", shared.frequency_list.len());
    println!("radio_dict: {} entries", shared.radio_dict.len());
    println!("rtp running: {}", dispatcher.rtp().is_running());
}
