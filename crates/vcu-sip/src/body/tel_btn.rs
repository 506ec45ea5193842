//! `TelBtnInfo` (88B), grounded in
//! `original_source/message_decoder/tel_btn_info_decoder.py`.

use crate::error::Result;

use super::{decode_fixed_str, decode_records, encode_fixed_str, encode_records};

const RECORD_SIZE: usize = 88;

/// One telephone-button catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelBtnInfo {
    pub position: i32,
    pub name: String,
    pub tel_number: String,
    pub needs_dial_popup: bool,
    pub can_use: bool,
    pub kind: i32,
    /// `iStatus` is `ctypes.c_uint` in the original: unsigned on the wire.
    pub status: u32,
    pub dep_id: i32,
}

impl TelBtnInfo {
    fn decode_one(raw: &[u8]) -> Result<Self> {
        Ok(TelBtnInfo {
            position: i32::from_le_bytes(raw[0..4].try_into().unwrap()),
            name: decode_fixed_str(&raw[4..36])?,
            tel_number: decode_fixed_str(&raw[36..68])?,
            needs_dial_popup: i32::from_le_bytes(raw[68..72].try_into().unwrap()) != 0,
            can_use: i32::from_le_bytes(raw[72..76].try_into().unwrap()) != 0,
            kind: i32::from_le_bytes(raw[76..80].try_into().unwrap()),
            status: u32::from_le_bytes(raw[80..84].try_into().unwrap()),
            dep_id: i32::from_le_bytes(raw[84..88].try_into().unwrap()),
        })
    }

    fn encode_one(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(RECORD_SIZE);
        buf.extend_from_slice(&self.position.to_le_bytes());
        buf.extend_from_slice(&encode_fixed_str(&self.name, 32)?);
        buf.extend_from_slice(&encode_fixed_str(&self.tel_number, 32)?);
        buf.extend_from_slice(&(self.needs_dial_popup as i32).to_le_bytes());
        buf.extend_from_slice(&(self.can_use as i32).to_le_bytes());
        buf.extend_from_slice(&self.kind.to_le_bytes());
        buf.extend_from_slice(&self.status.to_le_bytes());
        buf.extend_from_slice(&self.dep_id.to_le_bytes());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_a_single_entry() {
        let entry = TelBtnInfo {
            position: 1,
            name: "Test Button".to_string(),
            tel_number: "1234567890".to_string(),
            needs_dial_popup: true,
            can_use: true,
            kind: 2,
            status: 4,
            dep_id: 7,
        };
        let encoded = TelBtnInfo::encode_all(std::slice::from_ref(&entry)).unwrap();
        let decoded = TelBtnInfo::decode_all(&encoded).unwrap();
        assert_eq!(decoded, vec![entry]);
    }

    #[test]
    fn status_field_is_unsigned() {
        let entry = TelBtnInfo {
            position: 0,
            name: String::new(),
            tel_number: String::new(),
            needs_dial_popup: false,
            can_use: false,
            kind: 0,
            status: 0xFFFF_FFFF,
            dep_id: 0,
        };
        let encoded = TelBtnInfo::encode_all(std::slice::from_ref(&entry)).unwrap();
        let decoded = TelBtnInfo::decode_all(&encoded).unwrap();
        assert_eq!(decoded[0].status, 0xFFFF_FFFF);
    }
}
