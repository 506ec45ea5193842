//! Minimal SDP helpers (spec.md §4.5, §4.7), grounded in
//! `original_source/sip/sip_client.py::_generate_default_sdp` and the
//! `re.search(r"m=audio (\d+)", ...)` port extraction in
//! `_handle_radio_response`.
//!
//! This is not a general SDP parser — the dialect only ever exchanges the
//! fixed offer below and reads back one `m=audio <port>` line.

/// Build the client's fixed SDP offer for an INVITE body
/// (spec.md §4.4 "select_radio"). `local_rtp_port` is always the caller's
/// own RTP port; the original hardcodes `5200` here, which we treat as a
/// bug in the fixture rather than the protocol (see DESIGN.md) — a real
/// offer must advertise the endpoint's actual listen port.
pub fn build_offer(local_ip: &str, local_rtp_port: u16) -> String {
    format!(
        "v=0\r\n\
         o=SELUS 2890844527 1 IN IP4 {local_ip}\r\n\
         s=Sip Call\r\n\
         c=IN IP4 {local_ip}\r\n\
         t=0 0\r\n\
         m=audio {local_rtp_port} RTP/AVP 8\r\n\
         a=rtpmap:8 PCMA/8000\r\n\
         a=sendrecv\r\n"
    )
}

/// Extract the negotiated RTP port from an `m=audio <port> ...` line
/// (spec.md §4.5).
pub fn parse_answer_port(sdp: &str) -> Option<u16> {
    for line in sdp.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("m=audio ") {
            return rest.split_whitespace().next()?.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_carries_the_local_rtp_port() {
        let sdp = build_offer("127.0.0.1", 16387);
        assert!(sdp.contains("m=audio 16387 RTP/AVP 8"));
        assert!(sdp.contains("a=rtpmap:8 PCMA/8000"));
    }

    #[test]
    fn parses_port_from_answer() {
        let sdp = "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\nm=audio 5200 RTP/AVP 8\r\na=sendrecv\r\n";
        assert_eq!(parse_answer_port(sdp), Some(5200));
    }

    #[test]
    fn missing_m_line_yields_none() {
        assert_eq!(parse_answer_port("v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\n"), None);
    }
}
