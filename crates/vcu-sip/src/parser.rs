//! Wire parsing (spec.md §4.1), grounded in
//! `original_source/message_decoder/header_decoder.py`.

use nom::bytes::complete::{tag, take_till, take_while1};
use nom::character::complete::char;
use nom::combinator::opt;
use nom::sequence::preceded;
use nom::IResult;

use crate::error::Error;
use crate::method::{Method, MethodType};
use crate::params::MessageParams;

/// A parsed `sip:user@ip[:port]` URI, with the dialect's default port of 5060.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipUri {
    pub user: String,
    pub ip: String,
    pub port: u16,
}

fn uri_user(input: &str) -> IResult<&str, &str> {
    take_till(|c| c == '@')(input)
}

fn uri_host(input: &str) -> IResult<&str, &str> {
    take_till(|c| c == ':' || c == '>' || c == ';')(input)
}

fn uri_port(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit())(input)
}

/// Parse `sip:user@ip[:port]`, optionally wrapped in `<...>`, optionally
/// followed by `;params` which are ignored by this parser (callers that
/// need params, e.g. `Refer-To`, extract them separately).
fn parse_sip_uri(input: &str) -> Option<SipUri> {
    let input = input.trim();
    let input = input.strip_prefix('<').unwrap_or(input);

    let (rest, _): (&str, &str) = tag("sip:")(input).ok()?;
    let (rest, user) = uri_user(rest).ok()?;
    let (rest, _): (&str, char) = char('@')(rest).ok()?;
    let (rest, host) = uri_host(rest).ok()?;
    let (_, port): (&str, Option<&str>) = opt(preceded(char(':'), uri_port))(rest).ok()?;

    let port = match port {
        Some(p) => p.parse().ok()?,
        None => 5060,
    };

    Some(SipUri {
        user: user.to_string(),
        ip: host.to_string(),
        port,
    })
}

/// Extract a `;key=value` parameter's value from a header value, stopping
/// at the next `;` or `>`.
fn extract_param<'a>(value: &'a str, key: &str) -> Option<&'a str> {
    for part in value.split(';') {
        if let Some(v) = part.trim().strip_prefix(key) {
            if let Some(v) = v.strip_prefix('=') {
                return Some(v.trim_end_matches('>').trim());
            }
        }
    }
    None
}

/// Parse a complete wire message (header block and body; spec.md §4.1).
///
/// Body presence is decided purely by the `\r\n\r\n` marker, independent
/// of any `Content-Length` the peer claims (SPEC_FULL.md §4.1): a
/// mismatched length is not treated as a parse failure.
pub fn parse(message: &str) -> crate::error::Result<MessageParams> {
    let (header_part, body) = match message.split_once("\r\n\r\n") {
        Some((h, b)) => (h, Some(b)),
        None => (message, None),
    };

    let mut lines = header_part.split("\r\n");
    let first_line = lines.next().ok_or(Error::MissingStartLine)?;

    let mut method_type = MethodType::Request;
    let mut status_code = None;
    let mut reason_phrase = None;
    let mut server_user = String::new();
    let mut server_ip = String::new();
    let mut server_port = 5060u16;
    let mut message_type: Option<Method> = None;

    if let Some(rest) = first_line.strip_prefix("SIP/2.0 ") {
        method_type = MethodType::Response;
        let mut parts = rest.splitn(2, ' ');
        let code = parts.next().ok_or(Error::MissingStartLine)?;
        status_code = Some(code.parse::<u16>().map_err(|_| Error::MissingStartLine)?);
        reason_phrase = Some(parts.next().unwrap_or("").to_string());
    } else {
        let mut parts = first_line.splitn(2, ' ');
        let method_token = parts.next().ok_or(Error::MissingStartLine)?;
        let uri_and_version = parts.next().ok_or(Error::MissingStartLine)?;
        let uri_str = uri_and_version
            .split(' ')
            .next()
            .ok_or(Error::MissingStartLine)?;
        message_type = Some(method_token.parse()?);
        let uri = parse_sip_uri(uri_str).ok_or_else(|| Error::InvalidUri(uri_str.to_string()))?;
        server_user = uri.user;
        server_ip = uri.ip;
        server_port = uri.port;
    }

    let mut branch = None;
    let mut call_id = None;
    let mut cseq = None;
    let mut tag = None;
    let mut to_tag = None;
    let mut local_user = String::new();
    let mut local_ip = String::new();
    let mut local_port = 5060u16;
    let mut remote_user = None;
    let mut remote_ip = None;
    let mut remote_port = None;
    let mut max_forwards = crate::params::DEFAULT_MAX_FORWARDS;
    let mut subject = None;
    let mut expires = None;
    let mut contact = false;
    let mut allow = None;
    let mut supported = None;
    let mut content_type = None;
    let mut cwp = None;
    let mut roleid = None;
    let mut password = None;
    let mut refer_to = false;
    let mut refered_by = false;
    let mut method = None;
    let mut fragment_total = None;

    for line in lines {
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();

        match name.as_str() {
            "via" => {
                // "SIP/2.0/UDP <ip>:<port>;branch=..."
                let mut via_parts = value.split(';');
                let transport_ip_port = via_parts.next().unwrap_or("");
                if let Some(ip_port) = transport_ip_port.split(' ').nth(1) {
                    if let Some((ip, port)) = ip_port.split_once(':') {
                        local_ip = ip.to_string();
                        local_port = port.parse().unwrap_or(5060);
                    } else {
                        local_ip = ip_port.to_string();
                    }
                }
                for part in via_parts {
                    if let Some(v) = extract_param(part, "branch") {
                        branch = Some(v.to_string());
                    }
                }
            }
            "from" => {
                if let Some((uri_part, params_part)) = value.split_once(';') {
                    if let Some(uri) = parse_sip_uri(uri_part) {
                        local_user = uri.user;
                    }
                    for part in std::iter::once(params_part).chain(params_part.split(';').skip(1)) {
                        if let Some(v) = extract_param(part, "tag") {
                            tag = Some(v.to_string());
                        }
                        if let Some(v) = extract_param(part, "cwp") {
                            cwp = Some(v.to_string());
                        }
                        if let Some(v) = extract_param(part, "roleid") {
                            roleid = Some(v.to_string());
                        }
                        if let Some(v) = extract_param(part, "password") {
                            password = Some(v.to_string());
                        }
                    }
                } else if let Some(uri) = parse_sip_uri(value) {
                    local_user = uri.user;
                }
            }
            "to" => {
                if let Some((uri_part, params_part)) = value.split_once(';') {
                    if let Some(uri) = parse_sip_uri(uri_part) {
                        remote_user = Some(uri.user);
                        remote_ip = Some(uri.ip);
                        remote_port = Some(uri.port);
                    }
                    if let Some(v) = extract_param(params_part, "tag") {
                        to_tag = Some(v.to_string());
                    }
                } else if let Some(uri) = parse_sip_uri(value) {
                    remote_user = Some(uri.user);
                    remote_ip = Some(uri.ip);
                    remote_port = Some(uri.port);
                }
            }
            "call-id" => call_id = Some(value.to_string()),
            "cseq" => {
                let mut parts = value.split(' ');
                let n = parts
                    .next()
                    .and_then(|s| s.parse::<u32>().ok())
                    .ok_or_else(|| Error::InvalidCSeq(value.to_string()))?;
                cseq = Some(n);
                if method_type == MethodType::Response {
                    if let Some(m) = parts.next() {
                        message_type = Some(m.parse()?);
                    }
                }
            }
            "max-forwards" => {
                max_forwards = value.parse().unwrap_or(crate::params::DEFAULT_MAX_FORWARDS)
            }
            "subject" => subject = Some(value.to_string()),
            "expires" => expires = value.parse().ok(),
            "contact" => contact = true,
            "allow" => allow = Some(value.split(',').map(|s| s.trim().to_string()).collect()),
            "supported" => supported = Some(value.split(',').map(|s| s.trim().to_string()).collect()),
            "refer-to" => {
                refer_to = true;
                if let Some(m) = extract_param(value, "method") {
                    method = Some(m.to_string());
                }
            }
            "refered-by" => refered_by = true,
            "x-fragment-total" => fragment_total = value.parse().ok(),
            "content-type" => content_type = Some(value.to_string()),
            _ => {}
        }
    }

    let message_type = message_type.ok_or(Error::MissingStartLine)?;

    Ok(MessageParams {
        method_type,
        message_type,
        branch,
        call_id,
        cseq,
        tag,
        to_tag,
        local_user,
        local_ip,
        local_port,
        remote_user,
        remote_ip,
        remote_port,
        server_user,
        server_ip,
        server_port,
        max_forwards,
        subject,
        expires,
        contact,
        allow,
        supported,
        content_type,
        content: body.filter(|b| !b.is_empty()).map(|s| s.to_string()),
        status_code,
        reason_phrase,
        password,
        cwp,
        roleid,
        refer_to,
        refered_by,
        method,
        fragment_total,
    })
}
