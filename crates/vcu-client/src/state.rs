//! Client state machine variables (spec.md §3), grounded in
//! `original_source/sip/sip_client.py::__init__` and
//! `original_source/data_classes/comm_classes.py::Radio`.

use std::collections::{HashMap, HashSet};

use vcu_sip::body::RadioInfo;

/// `status ∈ {offline, online, busy}`, initial `offline` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Offline,
    Online,
    Busy,
}

impl Default for ClientStatus {
    fn default() -> Self {
        ClientStatus::Offline
    }
}

/// One radio catalog entry, keyed by its 12-byte code group
/// (spec.md §3 "Radio record"). Built directly from a decoded
/// [`RadioInfo`] wire record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Radio {
    pub frequency: String,
    /// `true`: this radio is a transmit (`send`) radio; `false`: receive.
    pub is_send: bool,
    pub available: bool,
}

impl From<&RadioInfo> for Radio {
    fn from(info: &RadioInfo) -> Self {
        Radio {
            frequency: info.frequency.clone(),
            is_send: info.is_send,
            available: info.is_available,
        }
    }
}

/// Everything the action context and the receive context both touch
/// (SPEC_FULL.md §5): status, the radio selection sets, the frequency/role
/// catalogs, and the switching flag. Guarded by a single
/// `parking_lot::Mutex` in [`crate::dispatcher::Dispatcher`]; the
/// transaction slot and CSeq counter live in `vcu-transaction` types that
/// already carry their own internal synchronization, so they are held as
/// separate fields rather than nested inside this struct (see DESIGN.md).
#[derive(Debug, Default)]
pub struct ClientShared {
    pub status: ClientStatus,
    pub selected_role: Option<String>,
    pub send_radio: HashSet<String>,
    pub recv_radio: HashSet<String>,
    pub frequency_list: Vec<String>,
    pub radio_dict: HashMap<String, Radio>,
    /// Four SIP-user-id channel slots parsed from `RoleInfo` on register
    /// (spec.md §3 "Role info"). Empty until register succeeds.
    pub channel_list: Vec<String>,
    /// `is_switching` renamed per spec.md §9 to avoid the original's
    /// method/attribute name collision (`is_switch_radio`).
    pub switching: bool,
}

impl ClientShared {
    pub fn new() -> Self {
        Self::default()
    }

    /// `channel_list[2]`, the local user id radio operations address
    /// themselves from (spec.md §3 invariant / §8 boundary behavior: fails
    /// cleanly when register hasn't populated it yet).
    pub fn radio_local_user(&self) -> Option<&str> {
        self.channel_list.get(2).map(String::as_str)
    }

    /// `channel_list[0]`, the local user id `get_all_frequency_btn` sends
    /// from (SPEC_FULL.md §4.4).
    pub fn all_freq_local_user(&self) -> Option<&str> {
        self.channel_list.first().map(String::as_str)
    }

    /// Whether no radio is currently held in either set.
    pub fn no_radio_selected(&self) -> bool {
        self.send_radio.is_empty() && self.recv_radio.is_empty()
    }

    /// Whether RTP should be running: the union of both sets is non-empty
    /// (spec.md §3 invariant).
    pub fn rtp_should_run(&self) -> bool {
        !self.no_radio_selected()
    }

    /// Any currently held radio code whose frequency differs from
    /// `code`'s, generalized per spec.md REDESIGN FLAGS from "inspect only
    /// the first held radio" to "any held radio whose frequency differs".
    pub fn mismatched_radios(&self, code: &str) -> Vec<String> {
        let Some(target) = self.radio_dict.get(code) else {
            return Vec::new();
        };
        self.send_radio
            .iter()
            .chain(self.recv_radio.iter())
            .filter(|held| {
                self.radio_dict
                    .get(*held)
                    .map(|r| r.frequency != target.frequency)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Add `code` to the set its `radio_dict` entry says it belongs to
    /// (spec.md §4.5: `type == 0` → send, else recv).
    pub fn add_radio(&mut self, code: &str) {
        let is_send = self.radio_dict.get(code).map(|r| r.is_send).unwrap_or(true);
        if is_send {
            self.send_radio.insert(code.to_string());
        } else {
            self.recv_radio.insert(code.to_string());
        }
    }

    /// Remove `code` from whichever set currently holds it.
    pub fn remove_radio(&mut self, code: &str) {
        self.send_radio.remove(code);
        self.recv_radio.remove(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_with_radios() -> ClientShared {
        let mut shared = ClientShared::new();
        shared.radio_dict.insert(
            "R1".to_string(),
            Radio { frequency: "121.500".to_string(), is_send: true, available: true },
        );
        shared.radio_dict.insert(
            "R2".to_string(),
            Radio { frequency: "121.500".to_string(), is_send: false, available: true },
        );
        shared.radio_dict.insert(
            "R3".to_string(),
            Radio { frequency: "131.600".to_string(), is_send: true, available: true },
        );
        shared
    }

    #[test]
    fn add_radio_routes_by_type() {
        let mut shared = shared_with_radios();
        shared.add_radio("R1");
        shared.add_radio("R2");
        assert!(shared.send_radio.contains("R1"));
        assert!(shared.recv_radio.contains("R2"));
    }

    #[test]
    fn remove_radio_clears_either_set() {
        let mut shared = shared_with_radios();
        shared.add_radio("R1");
        shared.remove_radio("R1");
        assert!(shared.no_radio_selected());
    }

    #[test]
    fn rtp_should_run_tracks_set_union() {
        let mut shared = shared_with_radios();
        assert!(!shared.rtp_should_run());
        shared.add_radio("R1");
        assert!(shared.rtp_should_run());
    }

    #[test]
    fn mismatched_radios_flags_every_differing_held_radio() {
        let mut shared = shared_with_radios();
        shared.add_radio("R1"); // 121.500, send
        shared.add_radio("R2"); // 121.500, recv
        assert!(shared.mismatched_radios("R3").contains(&"R1".to_string()));
        assert!(shared.mismatched_radios("R3").contains(&"R2".to_string()));
        assert!(shared.mismatched_radios("R1").is_empty());
    }

    #[test]
    fn radio_local_user_is_channel_slot_two() {
        let mut shared = ClientShared::new();
        assert_eq!(shared.radio_local_user(), None);
        shared.channel_list = vec!["316".into(), "317".into(), "318".into(), "319".into()];
        assert_eq!(shared.radio_local_user(), Some("318"));
    }

    /// Regression test for the `iRSType` polarity (spec.md §4.1: `type == 0`
    /// is send, nonzero is receive): decodes an actual on-wire `RadioInfo`
    /// record through `Radio::from`/`add_radio` instead of hand-building a
    /// `Radio`, so a reintroduced polarity flip in the wire codec is caught
    /// here rather than only in `vcu-sip`'s own unit tests.
    #[test]
    fn wire_decoded_send_type_lands_in_send_radio() {
        let wire = RadioInfo {
            position: 0,
            freq_name: "VHF Channel 1".to_string(),
            frequency: "145.500".to_string(),
            code: "5000".to_string(),
            radio_name: "Radio VHF 1".to_string(),
            is_send: true, // type == 0 on the wire
            is_available: true,
        };
        let encoded = RadioInfo::encode_all(std::slice::from_ref(&wire)).unwrap();
        let decoded = RadioInfo::decode_all(&encoded).unwrap();

        let mut shared = ClientShared::new();
        shared
            .radio_dict
            .insert("5000".to_string(), Radio::from(&decoded[0]));
        shared.add_radio("5000");

        assert!(shared.send_radio.contains("5000"));
        assert!(!shared.recv_radio.contains("5000"));
    }
}
