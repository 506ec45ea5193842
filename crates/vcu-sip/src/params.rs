use crate::method::{Method, MethodType};

/// The dialect's static `Allow` list (`original_source/sip/sip_client.py`).
pub const DEFAULT_ALLOW: &[&str] = &[
    "MESSAGE", "REFER", "INFO", "NOTIFY", "SUBSCRIBE", "CANCEL", "BYE", "OPTIONS", "ACK", "INVITE",
];

/// The dialect's static `Supported` list.
pub const DEFAULT_SUPPORTED: &[&str] = &["100rel", "replaces"];

/// Default `Max-Forwards` value (spec.md §3).
pub const DEFAULT_MAX_FORWARDS: u32 = 70;

/// One structured record covering every header field the dialect uses
/// (spec.md §3 "Message params").
///
/// Rather than mirror the original's per-method dataclass hierarchy
/// (`BaseMessageParams` / `RegisterParams` / `InfoParams` / `ReferParams`),
/// this is a single flat struct: the "variant" a message belongs to is
/// determined, as spec.md §4.1 requires, by which optional extension
/// fields are populated. `contact`, `refer_to`, and `refered_by` are
/// presence flags — when set, the wire codec derives the header content
/// from `local_user`/`local_ip`/`local_port` rather than storing
/// pre-rendered text, matching the original's boolean-flag convention.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageParams {
    pub method_type: MethodType,
    pub message_type: Method,
    pub branch: Option<String>,
    pub call_id: Option<String>,
    pub cseq: Option<u32>,
    pub tag: Option<String>,
    pub to_tag: Option<String>,

    pub local_user: String,
    pub local_ip: String,
    pub local_port: u16,

    pub remote_user: Option<String>,
    pub remote_ip: Option<String>,
    pub remote_port: Option<u16>,

    pub server_user: String,
    pub server_ip: String,
    pub server_port: u16,

    pub max_forwards: u32,
    pub subject: Option<String>,
    pub expires: Option<u32>,
    pub contact: bool,
    pub allow: Option<Vec<String>>,
    pub supported: Option<Vec<String>>,
    pub content_type: Option<String>,
    pub content: Option<String>,

    pub status_code: Option<u16>,
    pub reason_phrase: Option<String>,

    // Register extension
    pub password: Option<String>,
    pub cwp: Option<String>,

    // Info extension
    pub roleid: Option<String>,

    // Refer extension
    pub refer_to: bool,
    pub refered_by: bool,
    /// The nested method hint carried in `Refer-To;method=...` (e.g. `BYE`).
    pub method: Option<String>,

    /// `X-Fragment-Total`: the number of fragments the server is sending
    /// for one catalog response (SPEC_FULL.md §4.1, resolving the
    /// original's unspecified `check_final_message` terminal predicate).
    pub fragment_total: Option<u32>,
}

impl MessageParams {
    /// A request with the minimal required fields populated; everything
    /// else defaults as spec.md §3 describes (`max_forwards = 70`,
    /// `status_code = 200`, `reason_phrase = "OK"`).
    pub fn request(
        message_type: Method,
        local_user: impl Into<String>,
        local_ip: impl Into<String>,
        local_port: u16,
        server_user: impl Into<String>,
        server_ip: impl Into<String>,
        server_port: u16,
    ) -> Self {
        MessageParams {
            method_type: MethodType::Request,
            message_type,
            branch: None,
            call_id: None,
            cseq: None,
            tag: None,
            to_tag: None,
            local_user: local_user.into(),
            local_ip: local_ip.into(),
            local_port,
            remote_user: None,
            remote_ip: None,
            remote_port: None,
            server_user: server_user.into(),
            server_ip: server_ip.into(),
            server_port,
            max_forwards: DEFAULT_MAX_FORWARDS,
            subject: None,
            expires: None,
            contact: false,
            allow: None,
            supported: None,
            content_type: None,
            content: None,
            status_code: Some(200),
            reason_phrase: Some("OK".to_string()),
            password: None,
            cwp: None,
            roleid: None,
            refer_to: false,
            refered_by: false,
            method: None,
            fragment_total: None,
        }
    }

    /// A response built by echoing the request it answers, per spec.md
    /// §4.1 ("on responses, the method is echoed from the request").
    pub fn response_to(request: &MessageParams, status_code: u16, reason_phrase: impl Into<String>) -> Self {
        MessageParams {
            method_type: MethodType::Response,
            message_type: request.message_type,
            branch: request.branch.clone(),
            call_id: request.call_id.clone(),
            cseq: request.cseq,
            tag: request.tag.clone(),
            to_tag: request.to_tag.clone(),
            local_user: request.server_user.clone(),
            local_ip: request.server_ip.clone(),
            local_port: request.server_port,
            remote_user: Some(request.local_user.clone()),
            remote_ip: Some(request.local_ip.clone()),
            remote_port: Some(request.local_port),
            server_user: request.local_user.clone(),
            server_ip: request.local_ip.clone(),
            server_port: request.local_port,
            max_forwards: DEFAULT_MAX_FORWARDS,
            subject: request.subject.clone(),
            expires: None,
            contact: false,
            allow: None,
            supported: None,
            content_type: None,
            content: None,
            status_code: Some(status_code),
            reason_phrase: Some(reason_phrase.into()),
            password: None,
            cwp: None,
            roleid: None,
            refer_to: false,
            refered_by: false,
            method: None,
            fragment_total: None,
        }
    }

    /// Whether this is the Register variant (password or cwp set).
    pub fn is_register(&self) -> bool {
        self.password.is_some() || self.cwp.is_some()
    }

    /// Whether this is the Info variant (roleid set).
    pub fn is_info(&self) -> bool {
        self.roleid.is_some()
    }

    /// Whether this is the Refer variant.
    pub fn is_refer(&self) -> bool {
        self.refer_to || self.refered_by || self.method.is_some()
    }
}
