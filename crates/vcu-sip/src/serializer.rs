//! Wire serialization (spec.md §4.1), grounded in
//! `original_source/message_generator/message_generator.py`.

use rand::Rng;

use crate::method::MethodType;
use crate::params::MessageParams;

fn random_10_digit() -> String {
    rand::thread_rng()
        .gen_range(1_000_000_000u64..10_000_000_000)
        .to_string()
}

fn start_line(params: &MessageParams) -> String {
    match params.method_type {
        MethodType::Request => format!(
            "{} sip:{}@{}:{} SIP/2.0",
            params.message_type, params.server_user, params.server_ip, params.server_port
        ),
        MethodType::Response => format!(
            "SIP/2.0 {} {}",
            params.status_code.unwrap_or(200),
            params.reason_phrase.as_deref().unwrap_or("OK"),
        ),
    }
}

fn via_header(params: &MessageParams) -> String {
    let branch = params
        .branch
        .clone()
        .unwrap_or_else(|| format!("z9hG4bK-{}", random_10_digit()));
    format!(
        "SIP/2.0/UDP {}:{};branch={}",
        params.local_ip, params.local_port, branch
    )
}

fn from_header(params: &MessageParams, tag: &str) -> String {
    let mut header = if params.message_type == crate::method::Method::Register && params.password.is_some() {
        format!(
            "<sip:{}:{}@{}>;tag={}",
            params.local_user,
            params.password.as_deref().unwrap_or_default(),
            params.server_ip,
            tag
        )
    } else {
        format!("<sip:{}@{}>;tag={}", params.local_user, params.server_ip, tag)
    };
    if let Some(cwp) = &params.cwp {
        header.push_str(&format!(";cwp={cwp}"));
    }
    if let Some(roleid) = &params.roleid {
        header.push_str(&format!(";roleid={roleid}"));
    }
    header
}

fn to_header(params: &MessageParams, tag: &str) -> String {
    let needs_tag =
        params.method_type == MethodType::Response || params.message_type == crate::method::Method::Ack;
    if needs_tag {
        format!("<sip:{}@{}>;tag={}", params.server_user, params.server_ip, tag)
    } else {
        format!("<sip:{}@{}>", params.server_user, params.server_ip)
    }
}

fn contact_header(params: &MessageParams) -> String {
    format!("<sip:{}@{}:{}>", params.local_user, params.local_ip, params.local_port)
}

fn refer_to_header(params: &MessageParams) -> String {
    match &params.method {
        Some(method) => format!(
            "<sip:{}@{};method={}>",
            params.server_user, params.server_ip, method
        ),
        None => format!("<sip:{}@{}>", params.server_user, params.server_ip),
    }
}

fn refered_by_header(params: &MessageParams) -> String {
    format!("<sip:{}@{}>", params.local_user, params.local_ip)
}

/// Serialize [`MessageParams`] into the CRLF-terminated wire form
/// (spec.md §4.1). `fragment_total` is emitted as `X-Fragment-Total` when
/// set; populating it for a given reply is the caller's (`vcu-server`)
/// job, not this codec's.
pub fn serialize(params: &MessageParams) -> String {
    let tag = params
        .tag
        .clone()
        .unwrap_or_else(random_10_digit);
    let call_id = params
        .call_id
        .clone()
        .unwrap_or_else(|| format!("{}@{}", random_10_digit(), params.local_ip));

    let mut lines = vec![
        start_line(params),
        format!("Via: {}", via_header(params)),
        format!("From: {}", from_header(params, &tag)),
        format!("To: {}", to_header(params, &tag)),
        format!("Call-ID: {call_id}"),
        format!(
            "CSeq: {} {}",
            params.cseq.unwrap_or(0),
            params.message_type
        ),
        format!("Max-Forwards: {}", params.max_forwards),
    ];

    if let Some(subject) = &params.subject {
        lines.push(format!("Subject: {subject}"));
    }
    if let Some(expires) = params.expires {
        lines.push(format!("Expires: {expires}"));
    }
    if params.contact {
        lines.push(format!("Contact: {}", contact_header(params)));
    }
    if let Some(allow) = &params.allow {
        lines.push(format!("Allow: {}", allow.join(", ")));
    }
    if let Some(supported) = &params.supported {
        lines.push(format!("Supported: {}", supported.join(", ")));
    }
    if params.refer_to {
        lines.push(format!("Refer-To: {}", refer_to_header(params)));
    }
    if params.refered_by {
        // Bit-for-bit dialect typo (spec.md §9): "Refered-By", not "Referred-By".
        lines.push(format!("Refered-By: {}", refered_by_header(params)));
    }
    if let Some(total) = params.fragment_total {
        lines.push(format!("X-Fragment-Total: {total}"));
    }

    let content = params.content.clone().unwrap_or_default();
    let body = if content.is_empty() {
        "Content-Length: 0\r\n\r\n".to_string()
    } else {
        format!(
            "Content-Type: {}\r\nContent-Length: {}\r\n\r\n{}",
            params.content_type.as_deref().unwrap_or(""),
            content.len(),
            content
        )
    };

    format!("{}\r\n{}", lines.join("\r\n"), body)
}
