//! The paced RTP send/receive endpoint (spec.md §4.7, §5), grounded in
//! `original_source/rtp/rtp_endpoint.py` and the absolute-schedule pacing
//! pattern in `examples/eisenzopf-rvoip/crates/rtp-core/src/session/scheduling.rs`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::audio::{AudioSink, AudioSource};
use crate::codec::{decode_frame, encode_frame, rms, FRAME_SAMPLES};
use crate::error::{Error, Result};
use crate::header::{RtpHeader, HEADER_LEN, PAYLOAD_TYPE_PCMA};
use crate::jitter::{JitterBuffer, JitterFrame, DEFAULT_CAPACITY};

/// 20 ms frame pacing (spec.md §4.7).
const FRAME_DURATION: Duration = Duration::from_millis(20);
/// Read buffer for inbound datagrams (spec.md §4.7: "read up to 2 KiB").
const RECV_BUF_SIZE: usize = 2048;
/// Socket receive buffer (spec.md §4.7: "1 MiB receive buffer").
const SO_RCVBUF_BYTES: usize = 1024 * 1024;

/// The 20-ms-paced RTP media endpoint: one UDP socket, a send task
/// (capture → A-law → RTP) and a receive task (RTP → A-law decode →
/// jitter buffer → playback).
///
/// `start`/`stop` are the only lifecycle operations (spec.md §4.7): start
/// is idempotent, stop tears down both tasks, the socket, and clears the
/// jitter buffer.
pub struct RtpEndpoint {
    local_addr: SocketAddr,
    remote_addr: Mutex<SocketAddr>,
    voice_threshold: i32,
    ssrc: u32,
    sequence_number: Arc<AtomicU16>,
    timestamp: Arc<AtomicU32>,
    jitter_buffer: Arc<Mutex<JitterBuffer>>,
    running: Arc<AtomicBool>,
    send_task: Mutex<Option<JoinHandle<()>>>,
    recv_task: Mutex<Option<JoinHandle<()>>>,
}

impl RtpEndpoint {
    /// Construct an endpoint bound to `local_addr`, initially aimed at
    /// `remote_addr` (often superseded later by [`Self::set_remote_port`]
    /// once an INVITE/REFER response's SDP negotiates the real port).
    /// `ssrc` is random per spec.md §3 ("random on construction").
    pub fn new(local_addr: SocketAddr, remote_addr: SocketAddr, voice_threshold: i32) -> Self {
        Self {
            local_addr,
            remote_addr: Mutex::new(remote_addr),
            voice_threshold,
            ssrc: rand::random(),
            sequence_number: Arc::new(AtomicU16::new(0)),
            timestamp: Arc::new(AtomicU32::new(0)),
            jitter_buffer: Arc::new(Mutex::new(JitterBuffer::new(DEFAULT_CAPACITY))),
            running: Arc::new(AtomicBool::new(false)),
            send_task: Mutex::new(None),
            recv_task: Mutex::new(None),
        }
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Update the remote RTP port, e.g. after parsing `m=audio <port>`
    /// from a negotiated SDP answer (spec.md §4.5).
    pub fn set_remote_port(&self, port: u16) {
        self.remote_addr.lock().set_port(port);
    }

    /// Current jitter buffer depth, for diagnostics/tests.
    pub fn jitter_depth(&self) -> usize {
        self.jitter_buffer.lock().len()
    }

    /// Start the send and receive loops. No-op if already running
    /// (spec.md §4.7: "start is idempotent").
    pub async fn start(&self, source: Box<dyn AudioSource>, sink: Box<dyn AudioSink>) -> Result<()> {
        if self.running.swap(true, Ordering::AcqRel) {
            debug!("RTP endpoint already running; start is a no-op");
            return Ok(());
        }

        let socket = bind_socket(self.local_addr)?;
        let socket = Arc::new(socket);

        info!(local = %self.local_addr, "RTP endpoint starting");

        let send_handle = tokio::spawn(send_loop(
            socket.clone(),
            Arc::new(Mutex::new(*self.remote_addr.lock())),
            self.sequence_number.clone(),
            self.timestamp.clone(),
            self.ssrc,
            self.voice_threshold,
            source,
            self.running.clone(),
        ));

        let recv_handle = tokio::spawn(recv_loop(
            socket,
            self.jitter_buffer.clone(),
            sink,
            self.running.clone(),
        ));

        *self.send_task.lock() = Some(send_handle);
        *self.recv_task.lock() = Some(recv_handle);
        Ok(())
    }

    /// Stop both loops, drop the socket, and clear the jitter buffer
    /// (spec.md §4.7). Safe to call when not running.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.send_task.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.recv_task.lock().take() {
            handle.abort();
        }
        self.jitter_buffer.lock().clear();
        info!("RTP endpoint stopped");
    }
}

/// Bind the UDP socket with a 1 MiB receive buffer (spec.md §4.7), using
/// `socket2` for the option then handing the fd to tokio.
fn bind_socket(local_addr: SocketAddr) -> Result<UdpSocket> {
    use socket2::{Domain, Protocol, Socket, Type};

    let domain = if local_addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP)).map_err(Error::Transport)?;
    socket.set_recv_buffer_size(SO_RCVBUF_BYTES).map_err(Error::Transport)?;
    socket.set_nonblocking(true).map_err(Error::Transport)?;
    socket.bind(&local_addr.into()).map_err(Error::Transport)?;
    UdpSocket::from_std(socket.into()).map_err(Error::Transport)
}

/// Capture → compute voice activity → A-law encode → pack RTP → send,
/// once per 20 ms tick on a drift-compensated absolute schedule
/// (spec.md §4.7: "not fixed `sleep(20ms)`"; `tokio::time::interval`
/// tracks `start + n*period` internally, same idea as
/// `rvoip-rtp-core`'s `RtpScheduler::schedule_packet`).
#[allow(clippy::too_many_arguments)]
async fn send_loop(
    socket: Arc<UdpSocket>,
    remote_addr: Arc<Mutex<SocketAddr>>,
    sequence_number: Arc<AtomicU16>,
    timestamp: Arc<AtomicU32>,
    ssrc: u32,
    voice_threshold: i32,
    mut source: Box<dyn AudioSource>,
    running: Arc<AtomicBool>,
) {
    let mut ticker = time::interval(FRAME_DURATION);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while running.load(Ordering::Acquire) {
        ticker.tick().await;

        let samples = match source.capture_frame().await {
            Ok(samples) => samples,
            Err(e) => {
                warn!("audio capture failed, stopping RTP endpoint: {e}");
                running.store(false, Ordering::Release);
                break;
            }
        };

        let marker = rms(&samples) > voice_threshold as i64;
        let payload = encode_frame(&samples);

        let seq = sequence_number.fetch_add(1, Ordering::AcqRel);
        let ts = timestamp.fetch_add(FRAME_SAMPLES as u32, Ordering::AcqRel);

        let header = RtpHeader {
            marker,
            payload_type: PAYLOAD_TYPE_PCMA,
            sequence_number: seq,
            timestamp: ts,
            ssrc,
        };

        let mut packet = Vec::with_capacity(HEADER_LEN + payload.len());
        packet.extend_from_slice(&header.pack());
        packet.extend_from_slice(&payload);

        let remote = *remote_addr.lock();
        if let Err(e) = socket.send_to(&packet, remote).await {
            warn!("RTP send to {remote} failed: {e}");
        }
    }
}

/// Receive → validate header → A-law decode → jitter buffer → drain to
/// sink once the buffer reaches its configured depth (spec.md §4.7).
async fn recv_loop(
    socket: Arc<UdpSocket>,
    jitter_buffer: Arc<Mutex<JitterBuffer>>,
    mut sink: Box<dyn AudioSink>,
    running: Arc<AtomicBool>,
) {
    let mut buf = [0u8; RECV_BUF_SIZE];

    while running.load(Ordering::Acquire) {
        let n = match socket.recv(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("RTP recv failed: {e}");
                continue;
            }
        };

        if n < HEADER_LEN + FRAME_SAMPLES {
            debug!("dropping short RTP packet: {n} bytes");
            continue;
        }

        let header = match RtpHeader::unpack(&buf[..HEADER_LEN]) {
            Ok(h) => h,
            Err(e) => {
                debug!("dropping unparseable RTP packet: {e}");
                continue;
            }
        };

        let samples = decode_frame(&buf[HEADER_LEN..HEADER_LEN + FRAME_SAMPLES]);

        let drained = {
            let mut jb = jitter_buffer.lock();
            jb.push(JitterFrame { samples, marker: header.marker });
            if jb.is_full() {
                jb.pop()
            } else {
                None
            }
        };

        if let Some(frame) = drained {
            if let Err(e) = sink.play_frame(&frame.samples).await {
                warn!("audio playback failed, stopping RTP endpoint: {e}");
                running.store(false, Ordering::Release);
                break;
            }
        }
    }
}
