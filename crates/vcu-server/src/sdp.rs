//! Minimal SDP helpers for the server side of the radio INVITE/REFER flow
//! (spec.md §4.6, §4.7), the mirror image of `vcu-client`'s `sdp` module.
//!
//! Grounded in the same `original_source/sip/sip_client.py::_generate_default_sdp`
//! fixed grammar; the server answers with its own RTP port instead of
//! offering one.

/// Build the server's fixed SDP answer advertising its own RTP listen
/// port, for the `200 OK` that follows a radio INVITE.
pub fn build_answer(local_ip: &str, local_rtp_port: u16) -> String {
    format!(
        "v=0\r\n\
         o=SELUS 2890844527 2 IN IP4 {local_ip}\r\n\
         s=Sip Call\r\n\
         c=IN IP4 {local_ip}\r\n\
         t=0 0\r\n\
         m=audio {local_rtp_port} RTP/AVP 8\r\n\
         a=rtpmap:8 PCMA/8000\r\n\
         a=sendrecv\r\n"
    )
}

/// Extract the client's offered RTP port from an `m=audio <port> ...` line
/// in the INVITE body.
pub fn parse_offer_port(sdp: &str) -> Option<u16> {
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
    fn answer_carries_the_local_rtp_port() {
        let sdp = build_answer("127.0.0.1", 16386);
        assert!(sdp.contains("m=audio 16386 RTP/AVP 8"));
    }

    #[test]
    fn parses_port_from_offer() {
        let sdp = "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\nm=audio 16387 RTP/AVP 8\r\na=sendrecv\r\n";
        assert_eq!(parse_offer_port(sdp), Some(16387));
    }

    #[test]
    fn missing_m_line_yields_none() {
        assert_eq!(parse_offer_port("v=0\r\n"), None);
    }
}
