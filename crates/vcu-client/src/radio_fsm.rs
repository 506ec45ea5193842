//! The radio selection state machine (spec.md §4.5), grounded in
//! `original_source/sip/sip_client.py::_handle_radio_response`.
//!
//! Triggered on a successful 200 to a `radio`-subject request. The table
//! in spec.md §4.5 is implemented as [`classify`] (which table row the
//! sent request falls into) plus [`apply`] (the state mutation + RTP
//! directive that row implies).

use vcu_sip::method::Method;

/// Which row of spec.md §4.5's table the *sent* request matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioAction {
    /// INVITE: parse SDP, start RTP, add to a set, ACK.
    Invite,
    /// REFER with no nested method: add to a set.
    ReferAdd,
    /// REFER with `method=BYE`: remove from whichever set holds it.
    ReferRemove,
    /// Plain BYE: remove from whichever set holds it, stop RTP if empty.
    Bye,
}

/// Classify a just-acknowledged request by its method and (for REFER) its
/// nested method hint.
pub fn classify(message_type: Method, method_hint: Option<&str>) -> Option<RadioAction> {
    match message_type {
        Method::Invite => Some(RadioAction::Invite),
        Method::Refer => {
            if method_hint.is_some_and(|m| m.eq_ignore_ascii_case("BYE")) {
                Some(RadioAction::ReferRemove)
            } else {
                Some(RadioAction::ReferAdd)
            }
        }
        Method::Bye => Some(RadioAction::Bye),
        _ => None,
    }
}

/// What the caller must do to local state and the RTP endpoint after
/// applying a [`RadioAction`] to `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtpDirective {
    /// Start RTP (INVITE path only; the caller still must parse the SDP
    /// answer for the port before calling this).
    Start,
    /// No RTP lifecycle change.
    None,
    /// Stop RTP: both sets are now empty.
    Stop,
}

/// Apply `action` for radio `code` to `shared`, returning the RTP
/// directive the caller must carry out. Mutates `shared.send_radio`/
/// `recv_radio` only; RTP start/stop is left to the caller since it's
/// async and this function is not.
pub fn apply(shared: &mut crate::state::ClientShared, action: RadioAction, code: &str) -> RtpDirective {
    match action {
        RadioAction::Invite => {
            shared.add_radio(code);
            RtpDirective::Start
        }
        RadioAction::ReferAdd => {
            shared.add_radio(code);
            RtpDirective::None
        }
        RadioAction::ReferRemove | RadioAction::Bye => {
            shared.remove_radio(code);
            if shared.no_radio_selected() {
                RtpDirective::Stop
            } else {
                RtpDirective::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ClientShared, Radio};

    fn shared_with(code: &str, is_send: bool) -> ClientShared {
        let mut shared = ClientShared::new();
        shared.radio_dict.insert(
            code.to_string(),
            Radio { frequency: "121.500".to_string(), is_send, available: true },
        );
        shared
    }

    #[test]
    fn classifies_invite_refer_and_bye() {
        assert_eq!(classify(Method::Invite, None), Some(RadioAction::Invite));
        assert_eq!(classify(Method::Refer, None), Some(RadioAction::ReferAdd));
        assert_eq!(classify(Method::Refer, Some("BYE")), Some(RadioAction::ReferRemove));
        assert_eq!(classify(Method::Bye, None), Some(RadioAction::Bye));
        assert_eq!(classify(Method::Info, None), None);
    }

    #[test]
    fn invite_adds_to_send_set_and_starts_rtp() {
        let mut shared = shared_with("5000", true);
        let directive = apply(&mut shared, RadioAction::Invite, "5000");
        assert!(shared.send_radio.contains("5000"));
        assert_eq!(directive, RtpDirective::Start);
    }

    #[test]
    fn invite_adds_to_recv_set_when_radio_is_receive_type() {
        let mut shared = shared_with("5001", false);
        apply(&mut shared, RadioAction::Invite, "5001");
        assert!(shared.recv_radio.contains("5001"));
    }

    #[test]
    fn refer_add_does_not_change_rtp_lifecycle() {
        let mut shared = shared_with("5000", true);
        let directive = apply(&mut shared, RadioAction::ReferAdd, "5000");
        assert_eq!(directive, RtpDirective::None);
        assert!(shared.send_radio.contains("5000"));
    }

    #[test]
    fn bye_on_last_radio_stops_rtp() {
        let mut shared = shared_with("5000", true);
        shared.add_radio("5000");
        let directive = apply(&mut shared, RadioAction::Bye, "5000");
        assert_eq!(directive, RtpDirective::Stop);
        assert!(shared.no_radio_selected());
    }

    #[test]
    fn refer_bye_on_non_final_radio_keeps_rtp_running() {
        let mut shared = shared_with("5000", true);
        shared.radio_dict.insert(
            "5001".to_string(),
            Radio { frequency: "121.500".to_string(), is_send: false, available: true },
        );
        shared.add_radio("5000");
        shared.add_radio("5001");
        let directive = apply(&mut shared, RadioAction::ReferRemove, "5001");
        assert_eq!(directive, RtpDirective::None);
        assert!(shared.send_radio.contains("5000"));
        assert!(!shared.recv_radio.contains("5001"));
    }
}
