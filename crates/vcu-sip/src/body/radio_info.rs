//! `RadioInfo` (120B), grounded in
//! `original_source/message_decoder/radio_btn_info_decoder.py`.

use crate::error::Result;

use super::{decode_fixed_str, decode_records, encode_fixed_str, encode_records};

const RECORD_SIZE: usize = 120;

/// One radio catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioInfo {
    pub position: i32,
    pub freq_name: String,
    pub frequency: String,
    /// The radio's internal send-code group (`szCode`, 12B).
    pub code: String,
    pub radio_name: String,
    /// `iRSType` on the wire: `0` = send, nonzero = receive (spec.md §4.1).
    /// `true` here means send.
    pub is_send: bool,
    pub is_available: bool,
}

impl RadioInfo {
    fn decode_one(raw: &[u8]) -> Result<Self> {
        Ok(RadioInfo {
            position: i32::from_le_bytes(raw[0..4].try_into().unwrap()),
            freq_name: decode_fixed_str(&raw[4..36])?,
            frequency: decode_fixed_str(&raw[36..68])?,
            code: decode_fixed_str(&raw[68..80])?,
            radio_name: decode_fixed_str(&raw[80..112])?,
            is_send: i32::from_le_bytes(raw[112..116].try_into().unwrap()) == 0,
            is_available: i32::from_le_bytes(raw[116..120].try_into().unwrap()) != 0,
        })
    }

    fn encode_one(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(RECORD_SIZE);
        buf.extend_from_slice(&self.position.to_le_bytes());
        buf.extend_from_slice(&encode_fixed_str(&self.freq_name, 32)?);
        buf.extend_from_slice(&encode_fixed_str(&self.frequency, 32)?);
        buf.extend_from_slice(&encode_fixed_str(&self.code, 12)?);
        buf.extend_from_slice(&encode_fixed_str(&self.radio_name, 32)?);
        buf.extend_from_slice(&(!self.is_send as i32).to_le_bytes());
        buf.extend_from_slice(&(self.is_available as i32).to_le_bytes());
        Ok(buf)
    }

    pub fn decode_all(encoded: &str) -> Result<Vec<Self>> {
        decode_records(encoded, RECORD_SIZE)?
            .iter()
            .map(|raw| Self::decode_one(raw))
            .collect()
    }

    pub fn encode_all(entries: &[Self]) -> Result<String> {
        let records = entries
            .iter()
            .map(Self::encode_one)
            .collect::<Result<Vec<_>>>()?;
        Ok(encode_records(&records))
    }
}
