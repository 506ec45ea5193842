//! The receive context (spec.md §4.2, §4.3, §5): parse inbound datagrams,
//! correlate against the pending transaction, aggregate multi-fragment
//! catalog replies, drive the radio state machine, and run the
//! retransmission check.
//!
//! Grounded in `original_source/sip/sip_client.py::receive_message` /
//! `_handle_message`, which loops `_check_timeout()` then a blocking
//! `recvfrom`. We replace the busy-loop ordering with a `tokio::select!`
//! between the socket and a periodic retransmit tick, since a blocking
//! `recvfrom` would otherwise starve `_check_timeout` for an arbitrarily
//! long time.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

use vcu_sip::method::MethodType;
use vcu_sip::params::MessageParams;
use vcu_transaction::retransmit::{evaluate, RetransmitAction};

use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::radio_fsm;
use crate::sdp;
use crate::state::{ClientStatus, Radio};

/// How often the retransmit check runs between inbound datagrams
/// (spec.md §4.2 doesn't mandate a poll cadence beyond "check on a
/// timer"; 200 ms keeps the 5 s/3-retry policy responsive without
/// busy-looping).
const RETRANSMIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Read buffer for inbound datagrams (matches the original's `recvfrom(10240)`).
const RECV_BUF_SIZE: usize = 10240;

/// Drive the client's receive side for as long as `dispatcher` lives.
/// Intended to be spawned as its own task alongside whatever drives the
/// action methods.
pub async fn run_receive_loop(dispatcher: Arc<Dispatcher>, socket: Arc<UdpSocket>) {
    let mut buf = vec![0u8; RECV_BUF_SIZE];
    let mut retransmit_tick = tokio::time::interval(RETRANSMIT_POLL_INTERVAL);

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((n, _addr)) => {
                        let message = String::from_utf8_lossy(&buf[..n]).into_owned();
                        if let Err(e) = handle_inbound(&dispatcher, &message).await {
                            warn!("dropping inbound message: {e}");
                        }
                    }
                    Err(e) => warn!("receive failed: {e}"),
                }
            }
            _ = retransmit_tick.tick() => {
                check_retransmit(&dispatcher, &socket).await;
            }
        }
    }
}

async fn check_retransmit(dispatcher: &Dispatcher, socket: &UdpSocket) {
    let Some(pending) = dispatcher.slot().snapshot() else {
        return;
    };

    let action = evaluate(
        &pending,
        Instant::now(),
        dispatcher.config().retry_timeout(),
        dispatcher.config().max_retries as u8,
    );

    match action {
        RetransmitAction::Wait => {}
        RetransmitAction::Resend(wire) => {
            let remote = (dispatcher.config().remote_ip, dispatcher.config().remote_port);
            if let Err(e) = socket.send_to(wire.as_bytes(), remote).await {
                warn!("retransmit failed: {e}");
                return;
            }
            dispatcher.slot().mark_retransmitted(Instant::now());
        }
        RetransmitAction::Abandon => {
            warn!(cseq = ?pending.params.cseq, "abandoning transaction after max retries");
            dispatcher.slot().clear();
        }
    }
}

/// Parse and dispatch one inbound datagram. Any error here means the
/// message was dropped without mutating the pending transaction or
/// client state (spec.md §7 "Parse error" / §9 "reject mismatches rather
/// than fall through") — the slot stays occupied and retransmission
/// continues to run its course.
async fn handle_inbound(dispatcher: &Dispatcher, message: &str) -> Result<()> {
    let response = vcu_sip::parse(message)?;

    if response.method_type != MethodType::Response {
        return Ok(());
    }
    let Some(status) = response.status_code else {
        return Ok(());
    };
    if status != 200 {
        debug!(status, "non-200 response; leaving the transaction pending");
        return Ok(());
    }
    let Some(cseq) = response.cseq else {
        return Ok(());
    };
    if !dispatcher.slot().matches_cseq(cseq) {
        debug!(cseq, "response CSeq does not match the pending transaction; dropping");
        return Ok(());
    }
    let Some(pending) = dispatcher.slot().snapshot() else {
        return Ok(());
    };
    let sent = pending.params;

    vcu_transaction::correlate::check_subject_match(
        sent.subject.as_deref().unwrap_or(""),
        response.subject.as_deref(),
    )?;

    let subject = sent.subject.clone().unwrap_or_default();

    if is_catalog_subject(&subject) {
        handle_catalog_fragment(dispatcher, &subject, &response)?;
        match dispatcher.aggregator.record_fragment(&subject, response.fragment_total) {
            Some(true) => dispatcher.slot().clear(),
            Some(false) => {}
            None => warn!(subject, "catalog response missing X-Fragment-Total; dropping"),
        }
        return Ok(());
    }

    match subject.as_str() {
        "vcu_login" | "vcu_logout" => {
            dispatcher.shared.lock().status = if subject == "vcu_login" {
                ClientStatus::Online
            } else {
                ClientStatus::Offline
            };
        }
        "vcu_register" => {
            let body = response.content.as_deref().unwrap_or("");
            let role_info = vcu_sip::body::RoleInfo::decode(body)?;
            let mut shared = dispatcher.shared.lock();
            shared.channel_list = role_info.channels.to_vec();
            shared.selected_role = role_info
                .roles
                .first()
                .and_then(|r| r.split(':').next())
                .map(str::to_string);
            shared.status = ClientStatus::Online;
        }
        "radio" => {
            handle_radio_response(dispatcher, &sent, &response).await?;
        }
        _ => {}
    }

    dispatcher.slot().clear();
    Ok(())
}

/// Apply the radio state machine (spec.md §4.5) to a just-acknowledged
/// `radio`-subject request, starting/stopping RTP and ACKing an INVITE.
async fn handle_radio_response(
    dispatcher: &Dispatcher,
    sent: &MessageParams,
    response: &MessageParams,
) -> Result<()> {
    let code = sent.server_user.clone();
    let Some(action) = radio_fsm::classify(sent.message_type, sent.method.as_deref()) else {
        debug!(method = %sent.message_type, "radio response for an unrecognized method; ignoring");
        return Ok(());
    };

    if action == radio_fsm::RadioAction::Invite {
        if let Some(port) = response.content.as_deref().and_then(sdp::parse_answer_port) {
            dispatcher.rtp().set_remote_port(port);
        }
    }

    let directive = {
        let mut shared = dispatcher.shared.lock();
        radio_fsm::apply(&mut shared, action, &code)
    };

    match directive {
        radio_fsm::RtpDirective::Start => {
            let (source, sink) = dispatcher.build_audio_pair();
            dispatcher.rtp().start(source, sink).await?;
        }
        radio_fsm::RtpDirective::Stop => dispatcher.rtp().stop(),
        radio_fsm::RtpDirective::None => {}
    }

    if action == radio_fsm::RadioAction::Invite {
        dispatcher.ack(sent, response).await?;
    }

    Ok(())
}

fn is_catalog_subject(subject: &str) -> bool {
    matches!(subject, "vcu_phone" | "vcu_frequency" | "vcu_radio" | "vcu_function" | "all_freq")
}

fn expected_content_type(subject: &str) -> Option<&'static str> {
    match subject {
        "vcu_phone" => Some("application/phone_bt_info"),
        "vcu_frequency" | "all_freq" => Some("application/frequency_bt_info"),
        "vcu_radio" => Some("application/radio_bt_info"),
        "vcu_function" => Some("application/func_bt_info"),
        _ => None,
    }
}

/// Decode one catalog fragment's body and fold it into client state. The
/// content-type is checked against the subject before decoding — the
/// original falls through silently on a mismatch; spec.md §9 asks us to
/// reject instead.
fn handle_catalog_fragment(dispatcher: &Dispatcher, subject: &str, response: &MessageParams) -> Result<()> {
    let Some(expected) = expected_content_type(subject) else {
        return Ok(());
    };
    match response.content_type.as_deref() {
        Some(actual) if actual == expected => {}
        other => {
            return Err(Error::Transaction(vcu_transaction::Error::SubjectMismatch {
                expected: expected.to_string(),
                actual: other.unwrap_or("<none>").to_string(),
            }));
        }
    }

    let body = response.content.as_deref().unwrap_or("");
    match subject {
        "vcu_phone" => {
            vcu_sip::body::TelBtnInfo::decode_all(body)?;
        }
        "vcu_frequency" | "all_freq" => {
            let entries = vcu_sip::body::FreqBtnInfo::decode_all(body)?;
            let mut shared = dispatcher.shared.lock();
            for entry in entries {
                shared.frequency_list.push(entry.frequency);
            }
        }
        "vcu_radio" => {
            let entries = vcu_sip::body::RadioInfo::decode_all(body)?;
            let mut shared = dispatcher.shared.lock();
            for entry in &entries {
                shared.radio_dict.insert(entry.code.clone(), Radio::from(entry));
            }
        }
        "vcu_function" => {
            vcu_sip::body::FunBtnInfo::decode_all(body)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use vcu_common::config::EndpointConfig;
    use vcu_rtp::audio::{NullAudioSink, SilentAudioSource};
    use vcu_sip::body::RoleInfo;
    use vcu_sip::{serialize, Method};

    async fn paired_dispatcher() -> (Arc<Dispatcher>, Arc<UdpSocket>, UdpSocket) {
        let client_socket = Arc::new(UdpSocket::bind(("127.0.0.1", 0)).await.unwrap());
        let peer_socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let config = EndpointConfig {
            local_ip: "127.0.0.1".parse().unwrap(),
            local_port: client_socket.local_addr().unwrap().port(),
            remote_ip: "127.0.0.1".parse().unwrap(),
            remote_port: peer_socket.local_addr().unwrap().port(),
            local_rtp_port: 0,
            remote_rtp_port: 0,
            local_user: "bxp".to_string(),
            retry_timeout_secs: 5,
            max_retries: 3,
            voice_threshold: 100,
        };
        let dispatcher = Arc::new(Dispatcher::new(
            config,
            client_socket.clone(),
            Arc::new(|| Box::new(SilentAudioSource)),
            Arc::new(|| Box::new(NullAudioSink)),
        ));
        (dispatcher, client_socket, peer_socket)
    }

    #[tokio::test]
    async fn register_response_populates_channel_list() {
        let (dispatcher, _client_socket, peer_socket) = paired_dispatcher().await;
        dispatcher.register().await.unwrap();

        let sent = dispatcher.slot().snapshot().unwrap().params;
        let role_info = RoleInfo {
            channels: ["316".into(), "317".into(), "318".into(), "319".into()],
            roles: vec!["12:OP".to_string()],
            other_choose_roles: Vec::new(),
        };
        let mut response = MessageParams::response_to(&sent, 200, "OK");
        response.content = Some(role_info.encode().unwrap());
        let wire = serialize(&response);

        handle_inbound(&dispatcher, &wire).await.unwrap();

        let shared = dispatcher.shared.lock();
        assert_eq!(shared.channel_list, vec!["316", "317", "318", "319"]);
        assert_eq!(shared.selected_role.as_deref(), Some("12"));
        assert!(dispatcher.slot().is_empty());
        let _ = peer_socket;
    }

    #[tokio::test]
    async fn keep_alive_response_flips_status_online() {
        let (dispatcher, _client_socket, _peer_socket) = paired_dispatcher().await;
        dispatcher.keep_alive().await.unwrap();
        let sent = dispatcher.slot().snapshot().unwrap().params;
        assert_eq!(sent.subject.as_deref(), Some("vcu_logout"));

        let response = MessageParams::response_to(&sent, 200, "OK");
        let wire = serialize(&response);
        handle_inbound(&dispatcher, &wire).await.unwrap();

        assert_eq!(dispatcher.status(), ClientStatus::Offline);
        assert!(dispatcher.slot().is_empty());
    }

    #[tokio::test]
    async fn mismatched_subject_is_dropped_without_clearing_the_slot() {
        let (dispatcher, _client_socket, _peer_socket) = paired_dispatcher().await;
        dispatcher.keep_alive().await.unwrap();
        let sent = dispatcher.slot().snapshot().unwrap().params;

        let mut response = MessageParams::response_to(&sent, 200, "OK");
        response.subject = Some("vcu_phone".to_string());
        let wire = serialize(&response);

        assert!(handle_inbound(&dispatcher, &wire).await.is_err());
        assert!(!dispatcher.slot().is_empty());
    }

    #[tokio::test]
    async fn multi_fragment_frequency_catalog_completes_on_the_last_fragment() {
        let (dispatcher, _client_socket, _peer_socket) = paired_dispatcher().await;
        dispatcher.get_frequency_btn().await.unwrap();
        let sent = dispatcher.slot().snapshot().unwrap().params;

        let entry_a = vcu_sip::body::FreqBtnInfo {
            position: 0,
            freq_name: "A".to_string(),
            frequency: "121.500".to_string(),
            saving: 0,
            can_use: true,
        };
        let entry_b = vcu_sip::body::FreqBtnInfo {
            position: 1,
            freq_name: "B".to_string(),
            frequency: "121.600".to_string(),
            saving: 0,
            can_use: true,
        };

        let mut first = MessageParams::response_to(&sent, 200, "OK");
        first.content_type = Some("application/frequency_bt_info".to_string());
        first.content = Some(vcu_sip::body::FreqBtnInfo::encode_all(&[entry_a.clone()]).unwrap());
        first.fragment_total = Some(2);
        handle_inbound(&dispatcher, &serialize(&first)).await.unwrap();
        assert!(!dispatcher.slot().is_empty());

        let mut second = MessageParams::response_to(&sent, 200, "OK");
        second.content_type = Some("application/frequency_bt_info".to_string());
        second.content = Some(vcu_sip::body::FreqBtnInfo::encode_all(&[entry_b.clone()]).unwrap());
        second.fragment_total = Some(2);
        handle_inbound(&dispatcher, &serialize(&second)).await.unwrap();

        assert!(dispatcher.slot().is_empty());
        let shared = dispatcher.shared.lock();
        assert_eq!(shared.frequency_list, vec!["121.500", "121.600"]);
    }

    #[tokio::test]
    async fn invite_200_starts_rtp_and_sends_ack() {
        let (dispatcher, _client_socket, peer_socket) = paired_dispatcher().await;
        dispatcher.shared.lock().channel_list = vec!["316".into(), "317".into(), "318".into(), "319".into()];
        dispatcher.shared.lock().radio_dict.insert(
            "5000".to_string(),
            Radio { frequency: "121.500".to_string(), is_send: true, available: true },
        );

        dispatcher.select_radio("5000").await.unwrap();
        let sent = dispatcher.slot().snapshot().unwrap().params;
        assert_eq!(sent.message_type, Method::Invite);

        // Drain the INVITE itself so the next read on this socket sees the ACK.
        let mut drain = [0u8; 2048];
        peer_socket.recv_from(&mut drain).await.unwrap();

        let mut response = MessageParams::response_to(&sent, 200, "OK");
        response.content_type = Some("application/sdp".to_string());
        response.content = Some(
            "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\nm=audio 17000 RTP/AVP 8\r\na=sendrecv\r\n".to_string(),
        );
        handle_inbound(&dispatcher, &serialize(&response)).await.unwrap();

        assert!(dispatcher.slot().is_empty());
        assert!(dispatcher.shared.lock().send_radio.contains("5000"));
        assert!(dispatcher.rtp().is_running());
        dispatcher.rtp().stop();

        let mut buf = [0u8; 2048];
        let (n, _) = peer_socket.recv_from(&mut buf).await.unwrap();
        let wire = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(wire.starts_with("ACK"));
    }
}
