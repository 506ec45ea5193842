//! The server dialog handler (spec.md §4.6), grounded in
//! `original_source/sip/sip_server.py`: dispatch by `Subject`, fragment
//! catalog replies across numbered CSeqs, and run the `radio`-subject
//! INVITE/REFER/BYE flow against an RTP mirror.

use std::net::SocketAddr;

use tracing::warn;

use vcu_common::config::EndpointConfig;
use vcu_rtp::audio::{AudioSink, AudioSource};
use vcu_rtp::RtpEndpoint;
use vcu_sip::method::Method;
use vcu_sip::params::MessageParams;
use vcu_transaction::cseq::CseqAllocator;

use crate::error::{Error, Result};
use crate::fixtures::CannedReplyStore;
use crate::sdp;

/// A factory that produces a fresh boxed audio source/sink each time the
/// RTP mirror starts, mirroring `vcu_client::dispatcher`'s factories — the
/// mirror can be started and stopped many times over the server's life.
pub type AudioSourceFactory = std::sync::Arc<dyn Fn() -> Box<dyn AudioSource> + Send + Sync>;
pub type AudioSinkFactory = std::sync::Arc<dyn Fn() -> Box<dyn AudioSink> + Send + Sync>;

/// The content-type every response for `subject` carries (spec.md §6,
/// grepped verbatim from `original_source/sip/sip_server.py`).
fn catalog_content_type(subject: &str) -> &'static str {
    match subject {
        "vcu_phone" => "application/phone_bt_info",
        "vcu_frequency" | "all_freq" => "application/frequency_bt_info",
        "vcu_radio" => "application/radio_bt_info",
        "vcu_function" => "application/func_bt_info",
        _ => "application/octet-stream",
    }
}

fn is_fragmenting_subject(subject: &str) -> bool {
    matches!(subject, "vcu_phone" | "vcu_frequency" | "vcu_radio" | "vcu_function" | "all_freq")
}

/// One running server's dialog state: its canned replies and its RTP
/// mirror. There is exactly one dialog per configured peer; nothing here
/// is per-client beyond that.
pub struct ServerDialog {
    config: EndpointConfig,
    replies: CannedReplyStore,
    rtp: RtpEndpoint,
    audio_source: AudioSourceFactory,
    audio_sink: AudioSinkFactory,
}

impl ServerDialog {
    pub fn new(
        config: EndpointConfig,
        replies: CannedReplyStore,
        audio_source: AudioSourceFactory,
        audio_sink: AudioSinkFactory,
    ) -> Self {
        let local_addr: SocketAddr = (config.local_ip, config.local_rtp_port).into();
        let remote_addr: SocketAddr = (config.remote_ip, config.remote_rtp_port).into();
        let rtp = RtpEndpoint::new(local_addr, remote_addr, config.voice_threshold);
        Self { config, replies, rtp, audio_source, audio_sink }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn rtp(&self) -> &RtpEndpoint {
        &self.rtp
    }

    fn build_audio_pair(&self) -> (Box<dyn AudioSource>, Box<dyn AudioSink>) {
        ((self.audio_source)(), (self.audio_sink)())
    }

    /// Dispatch one inbound request to the responses it should produce, in
    /// the order they must be sent (spec.md §4.6). Most subjects produce
    /// exactly one response; the `radio` INVITE path produces a
    /// `100 Trying` followed by the `200 OK`; unrecognized subjects
    /// produce none.
    pub async fn handle_request(&self, request: &MessageParams) -> Result<Vec<MessageParams>> {
        let subject = request.subject.as_deref().unwrap_or_default();

        if is_fragmenting_subject(subject) {
            return self.fragmented_reply(request, subject);
        }

        match subject {
            "vcu_login" | "vcu_logout" => Ok(vec![self.simple_reply(request, "application/server_ip")?]),
            "vcu_register" => Ok(vec![self.simple_reply(request, "application/role_info")?]),
            "radio" => self.handle_radio(request).await,
            other => {
                warn!(subject = other, "no dialog handler for subject; dropping");
                Ok(Vec::new())
            }
        }
    }

    /// A single-fragment reply whose body is the fixture's one entry for
    /// `request`'s subject, CSeq echoed from the request (spec.md §4.6:
    /// only the catalog subjects get the subject-specific CSeq base).
    fn simple_reply(&self, request: &MessageParams, content_type: &str) -> Result<MessageParams> {
        let subject = request.subject.as_deref().unwrap_or_default();
        let (_, body) = self
            .replies
            .fragments(subject)
            .first()
            .ok_or_else(|| Error::MissingFixture(subject.to_string()))?;

        let mut response = MessageParams::response_to(request, 200, "OK");
        response.content_type = Some(content_type.to_string());
        response.content = Some(body.clone());
        Ok(response)
    }

    /// One response per canned fragment, CSeq starting at the
    /// subject-specific base and incrementing, every fragment carrying
    /// `X-Fragment-Total` (SPEC_FULL.md §4.1/§4.6). `vcu_phone` has no
    /// base (it isn't one of `CseqAllocator::fragment_base`'s subjects) so
    /// its lone fragment simply echoes the request's CSeq, same as the
    /// non-fragmenting subjects above.
    fn fragmented_reply(&self, request: &MessageParams, subject: &str) -> Result<Vec<MessageParams>> {
        let fragments = self.replies.fragments(subject);
        if fragments.is_empty() {
            return Err(Error::MissingFixture(subject.to_string()));
        }

        let total = fragments.len() as u32;
        let content_type = catalog_content_type(subject);
        let base = CseqAllocator::fragment_base(subject);

        Ok(fragments
            .iter()
            .enumerate()
            .map(|(i, (_name, body))| {
                let mut response = MessageParams::response_to(request, 200, "OK");
                response.content_type = Some(content_type.to_string());
                response.content = Some(body.clone());
                response.fragment_total = Some(total);
                response.cseq = Some(match base {
                    Some(b) => b + i as u32,
                    None => request.cseq.unwrap_or(0),
                });
                response
            })
            .collect())
    }

    /// The `radio`-subject flow (spec.md §4.6): INVITE starts the RTP
    /// mirror and answers with SDP after a provisional `100 Trying`; REFER
    /// (either variant) is a plain acknowledgement; BYE acknowledges and
    /// stops the mirror.
    async fn handle_radio(&self, request: &MessageParams) -> Result<Vec<MessageParams>> {
        match request.message_type {
            Method::Invite => {
                let trying = MessageParams::response_to(request, 100, "Trying");

                if let Some(port) = request.content.as_deref().and_then(sdp::parse_offer_port) {
                    self.rtp.set_remote_port(port);
                }
                let (source, sink) = self.build_audio_pair();
                self.rtp.start(source, sink).await?;

                let mut ok = MessageParams::response_to(request, 200, "OK");
                ok.content_type = Some("application/sdp".to_string());
                ok.content = Some(sdp::build_answer(
                    &self.config.local_ip.to_string(),
                    self.config.local_rtp_port,
                ));

                Ok(vec![trying, ok])
            }
            Method::Refer => Ok(vec![MessageParams::response_to(request, 200, "OK")]),
            Method::Bye => {
                self.rtp.stop();
                Ok(vec![MessageParams::response_to(request, 200, "OK")])
            }
            other => {
                warn!(method = %other, "unexpected method for radio subject; dropping");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcu_rtp::audio::{NullAudioSink, SilentAudioSource};
    use vcu_sip::method::MethodType;

    fn sample_config() -> EndpointConfig {
        EndpointConfig {
            local_ip: "127.0.0.1".parse().unwrap(),
            local_port: 5061,
            remote_ip: "127.0.0.1".parse().unwrap(),
            remote_port: 5060,
            local_rtp_port: 0,
            remote_rtp_port: 0,
            local_user: "bxp".to_string(),
            retry_timeout_secs: 5,
            max_retries: 3,
            voice_threshold: 100,
        }
    }

    fn sample_replies() -> CannedReplyStore {
        CannedReplyStore::from_str(
            r#"{
                "vcu_login": {"server_ip": "AAA="},
                "vcu_logout": {"server_ip": "AAA="},
                "vcu_register": {"role_info": "QQ=="},
                "vcu_phone": {"phone_bt_info": "Qg=="},
                "vcu_frequency": {"0": "Qw==", "1": "RA==", "2": "RQ=="},
                "vcu_radio": {"0": "Rg=="},
                "vcu_function": {"0": "Rw==", "1": "SA=="},
                "all_freq": {"0": "SQ=="}
            }"#,
        )
        .unwrap()
    }

    fn dialog() -> ServerDialog {
        ServerDialog::new(
            sample_config(),
            sample_replies(),
            std::sync::Arc::new(|| Box::new(SilentAudioSource)),
            std::sync::Arc::new(|| Box::new(NullAudioSink)),
        )
    }

    fn info_request(subject: &str) -> MessageParams {
        let mut p = MessageParams::request(Method::Info, "bxp", "127.0.0.1", 5060, "bxp", "127.0.0.1", 5061);
        p.cseq = Some(42);
        p.subject = Some(subject.to_string());
        p
    }

    #[tokio::test]
    async fn login_gets_a_single_server_ip_reply() {
        let responses = dialog().handle_request(&info_request("vcu_login")).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].content_type.as_deref(), Some("application/server_ip"));
        assert_eq!(responses[0].cseq, Some(42));
        assert!(responses[0].fragment_total.is_none());
    }

    #[tokio::test]
    async fn frequency_catalog_fragments_with_incrementing_cseq_from_base() {
        let responses = dialog().handle_request(&info_request("vcu_frequency")).await.unwrap();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].cseq, Some(1025));
        assert_eq!(responses[1].cseq, Some(1026));
        assert_eq!(responses[2].cseq, Some(1027));
        assert!(responses.iter().all(|r| r.fragment_total == Some(3)));
        assert!(responses.iter().all(|r| r.content_type.as_deref() == Some("application/frequency_bt_info")));
    }

    #[tokio::test]
    async fn function_catalog_increments_cseq_from_its_base_not_the_request_cseq() {
        let responses = dialog().handle_request(&info_request("vcu_function")).await.unwrap();
        assert_eq!(responses[0].cseq, Some(257));
        assert_eq!(responses[1].cseq, Some(258));
    }

    #[tokio::test]
    async fn phone_catalog_echoes_the_request_cseq_since_it_has_no_base() {
        let responses = dialog().handle_request(&info_request("vcu_phone")).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].cseq, Some(42));
        assert_eq!(responses[0].fragment_total, Some(1));
    }

    #[tokio::test]
    async fn missing_fixture_subject_is_an_error() {
        let mut request = info_request("vcu_radio");
        request.subject = Some("vcu_radio".to_string());
        // vcu_radio has one fixture entry, so this should succeed...
        assert!(dialog().handle_request(&request).await.is_ok());
        // ...but an entirely absent subject should not.
        request.subject = Some("no_such_subject".to_string());
        let responses = dialog().handle_request(&request).await.unwrap();
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn radio_invite_sends_trying_then_sdp_ok_and_starts_rtp() {
        let dialog = dialog();
        let mut request = MessageParams::request(Method::Invite, "5000", "127.0.0.1", 5060, "5000", "127.0.0.1", 5061);
        request.subject = Some("radio".to_string());
        request.content = Some("v=0\r\nm=audio 16387 RTP/AVP 8\r\n".to_string());

        let responses = dialog.handle_request(&request).await.unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].status_code, Some(100));
        assert_eq!(responses[1].status_code, Some(200));
        assert_eq!(responses[1].content_type.as_deref(), Some("application/sdp"));
        assert!(dialog.rtp().is_running());
        dialog.rtp().stop();
    }

    #[tokio::test]
    async fn radio_bye_acks_and_stops_rtp() {
        let dialog = dialog();
        dialog
            .rtp()
            .start(Box::new(SilentAudioSource), Box::new(NullAudioSink))
            .await
            .unwrap();
        assert!(dialog.rtp().is_running());

        let mut request = MessageParams::request(Method::Bye, "5000", "127.0.0.1", 5060, "5000", "127.0.0.1", 5061);
        request.subject = Some("radio".to_string());
        request.method_type = MethodType::Request;

        let responses = dialog.handle_request(&request).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status_code, Some(200));
        assert!(!dialog.rtp().is_running());
    }

    #[tokio::test]
    async fn radio_refer_without_method_is_a_plain_ack() {
        let dialog = dialog();
        let mut request = MessageParams::request(Method::Refer, "5000", "127.0.0.1", 5060, "5000", "127.0.0.1", 5061);
        request.subject = Some("radio".to_string());

        let responses = dialog.handle_request(&request).await.unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].status_code, Some(200));
    }
}
