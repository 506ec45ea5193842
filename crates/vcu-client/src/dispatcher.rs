//! The client action context (spec.md §4.4, §5): builds and sends each
//! outbound request, gated by the single-in-flight transaction slot.
//!
//! Grounded in `original_source/sip/sip_client.py`, where every action
//! method opens with `self._wait_response()` then
//! `self._cseq_increment()` then `self._send_message(params)`. Those three
//! steps become [`Dispatcher::send`]'s gate/allocate/occupy sequence; the
//! per-action header assembly below mirrors each Python method one for
//! one.

use std::net::SocketAddr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::time::Instant;

use vcu_common::config::EndpointConfig;
use vcu_rtp::audio::{AudioSink, AudioSource};
use vcu_rtp::RtpEndpoint;
use vcu_sip::method::Method;
use vcu_sip::params::{MessageParams, DEFAULT_ALLOW, DEFAULT_SUPPORTED};
use vcu_sip::serializer::serialize;
use vcu_transaction::aggregator::CatalogAggregator;
use vcu_transaction::cseq::CseqAllocator;
use vcu_transaction::slot::{PendingTransaction, TransactionSlot};

use crate::error::{Error, Result};
use crate::sdp;
use crate::state::ClientShared;

/// A factory that produces a fresh boxed audio source each time RTP
/// starts. `RtpEndpoint::start` consumes its `Box<dyn AudioSource>`, and
/// over one client's life a radio can be selected, released, and
/// reselected many times, so a single pre-built box won't do.
pub type AudioSourceFactory = Arc<dyn Fn() -> Box<dyn AudioSource> + Send + Sync>;
/// The sink counterpart of [`AudioSourceFactory`].
pub type AudioSinkFactory = Arc<dyn Fn() -> Box<dyn AudioSink> + Send + Sync>;

/// The client's action context: one per running client, shared (via
/// `Arc`) between whichever task calls the action methods below and the
/// task driving [`crate::receive::run_receive_loop`].
pub struct Dispatcher {
    config: EndpointConfig,
    socket: Arc<UdpSocket>,
    slot: TransactionSlot,
    cseq: CseqAllocator,
    pub(crate) aggregator: CatalogAggregator,
    pub(crate) shared: Mutex<ClientShared>,
    pub(crate) rtp: RtpEndpoint,
    audio_source: AudioSourceFactory,
    audio_sink: AudioSinkFactory,
}

impl Dispatcher {
    pub fn new(
        config: EndpointConfig,
        socket: Arc<UdpSocket>,
        audio_source: AudioSourceFactory,
        audio_sink: AudioSinkFactory,
    ) -> Self {
        let local_addr: SocketAddr = (config.local_ip, config.local_rtp_port).into();
        let remote_addr: SocketAddr = (config.remote_ip, config.remote_rtp_port).into();
        let rtp = RtpEndpoint::new(local_addr, remote_addr, config.voice_threshold);
        Self {
            slot: TransactionSlot::new(),
            cseq: CseqAllocator::new(),
            aggregator: CatalogAggregator::new(),
            shared: Mutex::new(ClientShared::new()),
            rtp,
            config,
            socket,
            audio_source,
            audio_sink,
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn slot(&self) -> &TransactionSlot {
        &self.slot
    }

    pub fn rtp(&self) -> &RtpEndpoint {
        &self.rtp
    }

    /// A snapshot of the client state machine variables, for callers that
    /// just need to read status/catalogs (e.g. a CLI prompt).
    pub fn status(&self) -> crate::state::ClientStatus {
        self.shared.lock().status
    }

    /// The shared client state machine variables (spec.md §3), for
    /// callers (e.g. a CLI front-end) that need to read more than just
    /// [`Self::status`].
    pub fn shared(&self) -> &Mutex<ClientShared> {
        &self.shared
    }

    fn new_request(&self, message_type: Method, server_user: &str, local_user: &str) -> MessageParams {
        MessageParams::request(
            message_type,
            local_user.to_string(),
            self.config.local_ip.to_string(),
            self.config.local_port,
            server_user.to_string(),
            self.config.remote_ip.to_string(),
            self.config.remote_port,
        )
    }

    /// Gate on the slot being empty, allocate a CSeq, send, and occupy
    /// the slot with the just-sent transaction (spec.md §4.2's
    /// wait/allocate/send/occupy ordering).
    async fn send(&self, mut params: MessageParams) -> Result<()> {
        self.slot.wait_until_empty().await;
        params.cseq = Some(self.cseq.next());
        let wire = serialize(&params);
        self.socket
            .send_to(wire.as_bytes(), (self.config.remote_ip, self.config.remote_port))
            .await?;
        self.slot.occupy(PendingTransaction {
            params,
            wire_bytes: wire,
            first_sent_at: Instant::now(),
            retries_used: 0,
        });
        Ok(())
    }

    /// Heartbeat: `vcu_login` while online, `vcu_logout` while offline
    /// (spec.md §4.4 "keep_alive").
    pub async fn keep_alive(&self) -> Result<()> {
        let online = matches!(self.shared.lock().status, crate::state::ClientStatus::Online);
        let subject = if online { "vcu_login" } else { "vcu_logout" };
        let user = self.config.local_user.clone();
        let mut params = self.new_request(Method::Info, &user, &user);
        params.subject = Some(subject.to_string());
        params.expires = Some(5);
        self.send(params).await
    }

    /// Register, carrying the constant base64-of-username `password` and
    /// `cwp` extension params (spec.md §4.4 "register").
    pub async fn register(&self) -> Result<()> {
        let user = self.config.local_user.clone();
        let mut params = self.new_request(Method::Register, &user, &user);
        params.subject = Some("vcu_register".to_string());
        params.expires = Some(5);
        params.password = Some(STANDARD.encode(user.as_bytes()));
        params.cwp = Some(user.clone());
        self.send(params).await
    }

    fn catalog_request(&self, subject: &str) -> MessageParams {
        let (user, selected_role) = {
            let shared = self.shared.lock();
            (self.config.local_user.clone(), shared.selected_role.clone())
        };
        let mut params = self.new_request(Method::Info, &user, &user);
        params.subject = Some(subject.to_string());
        params.roleid = selected_role;
        params
    }

    /// `vcu_phone` (spec.md §4.4 "get_phone_btn").
    pub async fn get_phone_btn(&self) -> Result<()> {
        self.send(self.catalog_request("vcu_phone")).await
    }

    /// `vcu_frequency` (spec.md §4.4 "get_frequency_btn").
    pub async fn get_frequency_btn(&self) -> Result<()> {
        self.send(self.catalog_request("vcu_frequency")).await
    }

    /// `vcu_radio`, carrying the client's currently known frequency list
    /// as a `+`-joined `application/frequency` body (spec.md §4.4
    /// "get_radio_btn").
    pub async fn get_radio_btn(&self) -> Result<()> {
        let mut params = self.catalog_request("vcu_radio");
        let joined = self.shared.lock().frequency_list.join("+");
        params.content_type = Some("application/frequency".to_string());
        params.content = Some(joined);
        self.send(params).await
    }

    /// `vcu_function` (spec.md §4.4 "get_function_btn").
    pub async fn get_function_btn(&self) -> Result<()> {
        self.send(self.catalog_request("vcu_function")).await
    }

    /// `all_freq`, sent from `channel_list[0]` rather than the endpoint's
    /// own seat id (spec.md §4.4 "get_all_frequency_btn" — requires
    /// `register` to have populated `channel_list` first).
    pub async fn get_all_frequency_btn(&self) -> Result<()> {
        let (local_user, selected_role) = {
            let shared = self.shared.lock();
            let local_user = shared
                .all_freq_local_user()
                .ok_or(Error::ChannelListEmpty)?
                .to_string();
            (local_user, shared.selected_role.clone())
        };
        let server_user = self.config.local_user.clone();
        let mut params = self.new_request(Method::Info, &server_user, &local_user);
        params.subject = Some("all_freq".to_string());
        params.roleid = selected_role;
        self.send(params).await
    }

    /// Select a radio: an INVITE if no radio is currently held, otherwise
    /// a REFER — pre-empting any held radio on a different frequency with
    /// a BYE first (spec.md §4.5, generalized per REDESIGN FLAGS from the
    /// original's first-held-radio-only check to every mismatched held
    /// radio).
    pub async fn select_radio(&self, code: &str) -> Result<()> {
        let local_user = {
            let shared = self.shared.lock();
            shared.radio_local_user().ok_or(Error::ChannelListEmpty)?.to_string()
        };
        let no_radio_selected = self.shared.lock().no_radio_selected();

        if no_radio_selected {
            let mut params = self.new_request(Method::Invite, code, &local_user);
            params.subject = Some("radio".to_string());
            params.expires = Some(5);
            params.contact = true;
            params.allow = Some(DEFAULT_ALLOW.iter().map(|s| s.to_string()).collect());
            params.supported = Some(DEFAULT_SUPPORTED.iter().map(|s| s.to_string()).collect());
            params.content_type = Some("application/sdp".to_string());
            params.content = Some(sdp::build_offer(&self.config.local_ip.to_string(), self.config.local_rtp_port));
            return self.send(params).await;
        }

        let mismatched = self.shared.lock().mismatched_radios(code);
        if !mismatched.is_empty() {
            self.shared.lock().switching = true;
            for held in &mismatched {
                self.bye(held).await?;
                self.slot.wait_until_empty().await;
            }
            self.shared.lock().switching = false;
        }

        let mut params = self.new_request(Method::Refer, code, &local_user);
        params.subject = Some("radio".to_string());
        params.expires = Some(5);
        params.refer_to = true;
        params.refered_by = true;
        self.send(params).await
    }

    /// Release a held radio: a plain BYE if it's the only one held and
    /// not mid-switch, otherwise a `REFER;method=BYE` (spec.md §4.4
    /// "bye", §4.5).
    pub async fn bye(&self, code: &str) -> Result<()> {
        let local_user = {
            let shared = self.shared.lock();
            shared.radio_local_user().ok_or(Error::ChannelListEmpty)?.to_string()
        };
        let (switching, multi) = {
            let shared = self.shared.lock();
            (shared.switching, shared.send_radio.len() + shared.recv_radio.len() > 1)
        };

        let message_type = if switching || multi { Method::Refer } else { Method::Bye };
        let mut params = self.new_request(message_type, code, &local_user);
        params.subject = Some("radio".to_string());
        params.expires = Some(5);
        if switching || multi {
            params.refer_to = true;
            params.refered_by = true;
            params.method = Some("BYE".to_string());
        }
        self.send(params).await
    }

    /// Fire-and-forget ACK of an INVITE's 200, echoing the response's
    /// CSeq/tag/to-tag and the originally-sent INVITE's server user
    /// (spec.md §4.4 "ack" — not gated by the slot; the original never
    /// waits for an ACK's own reply, there isn't one).
    pub async fn ack(&self, sent_invite: &MessageParams, response: &MessageParams) -> Result<()> {
        let local_user = {
            let shared = self.shared.lock();
            shared.radio_local_user().ok_or(Error::ChannelListEmpty)?.to_string()
        };
        let mut params = self.new_request(Method::Ack, &sent_invite.server_user, &local_user);
        params.cseq = response.cseq;
        params.tag = response.tag.clone();
        params.to_tag = response.to_tag.clone();
        params.subject = Some("radio".to_string());
        params.allow = Some(DEFAULT_ALLOW.iter().map(|s| s.to_string()).collect());
        params.supported = Some(DEFAULT_SUPPORTED.iter().map(|s| s.to_string()).collect());
        let wire = serialize(&params);
        self.socket
            .send_to(wire.as_bytes(), (self.config.remote_ip, self.config.remote_port))
            .await?;
        Ok(())
    }

    /// Build a boxed audio source/sink pair for a fresh RTP start, via the
    /// factories supplied at construction.
    pub(crate) fn build_audio_pair(&self) -> (Box<dyn AudioSource>, Box<dyn AudioSink>) {
        ((self.audio_source)(), (self.audio_sink)())
    }

    /// Push-to-talk key-up. Part of the operational surface spec.md §6
    /// lists alongside the other action methods, but PTT itself is
    /// referenced only in the glossary and never implemented by the
    /// original source — there is no wire message or local state this
    /// triggers. Kept as an explicit no-op rather than omitted, so a
    /// caller wiring a physical PTT key to this crate has a stable call
    /// site to bind to once a console actually needs it.
    pub fn key_up(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcu_rtp::audio::{NullAudioSink, SilentAudioSource};

    async fn dispatcher_on(port: u16) -> Dispatcher {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let config = EndpointConfig {
            local_ip: "127.0.0.1".parse().unwrap(),
            local_port: socket.local_addr().unwrap().port(),
            remote_ip: "127.0.0.1".parse().unwrap(),
            remote_port: port,
            local_rtp_port: 0,
            remote_rtp_port: 0,
            local_user: "bxp".to_string(),
            retry_timeout_secs: 5,
            max_retries: 3,
            voice_threshold: 100,
        };
        Dispatcher::new(
            config,
            Arc::new(socket),
            Arc::new(|| Box::new(SilentAudioSource)),
            Arc::new(|| Box::new(NullAudioSink)),
        )
    }

    #[tokio::test]
    async fn keep_alive_sends_logout_subject_while_offline() {
        let echo = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let echo_port = echo.local_addr().unwrap().port();
        let dispatcher = dispatcher_on(echo_port).await;

        dispatcher.keep_alive().await.unwrap();

        let mut buf = [0u8; 2048];
        let n = echo.recv(&mut buf).await.unwrap();
        let wire = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(wire.contains("vcu_logout"));
        assert!(!dispatcher.slot.is_empty());
    }

    #[tokio::test]
    async fn register_carries_password_and_cwp() {
        let echo = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let echo_port = echo.local_addr().unwrap().port();
        let dispatcher = dispatcher_on(echo_port).await;

        dispatcher.register().await.unwrap();

        let mut buf = [0u8; 2048];
        let n = echo.recv(&mut buf).await.unwrap();
        let wire = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(wire.contains("vcu_register"));
        assert!(wire.contains(&STANDARD.encode(b"bxp")));
    }

    #[tokio::test]
    async fn select_radio_before_register_fails_cleanly() {
        let dispatcher = dispatcher_on(1).await;
        let err = dispatcher.select_radio("5000").await.unwrap_err();
        assert!(matches!(err, Error::ChannelListEmpty));
    }

    #[tokio::test]
    async fn select_radio_sends_invite_when_none_held() {
        let echo = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let echo_port = echo.local_addr().unwrap().port();
        let dispatcher = dispatcher_on(echo_port).await;
        dispatcher.shared.lock().channel_list =
            vec!["316".into(), "317".into(), "318".into(), "319".into()];

        dispatcher.select_radio("5000").await.unwrap();

        let mut buf = [0u8; 2048];
        let n = echo.recv(&mut buf).await.unwrap();
        let wire = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(wire.starts_with("INVITE"));
        assert!(wire.contains("application/sdp"));
    }
}
