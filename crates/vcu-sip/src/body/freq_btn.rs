//! `FreqBtnInfo` (76B), grounded in
//! `original_source/message_decoder/freq_btn_info_decoder.py`.

use crate::error::Result;

use super::{decode_fixed_str, decode_records, encode_fixed_str, encode_records};

const RECORD_SIZE: usize = 76;

/// One frequency-button catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreqBtnInfo {
    pub position: i32,
    pub freq_name: String,
    pub frequency: String,
    /// `0`: normal, `1`: emergency (`iSaving` in the original).
    pub saving: i32,
    /// Whether the button is enabled.
    pub can_use: bool,
}

impl FreqBtnInfo {
    fn decode_one(raw: &[u8]) -> Result<Self> {
        Ok(FreqBtnInfo {
            position: i32::from_le_bytes(raw[0..4].try_into().unwrap()),
            freq_name: decode_fixed_str(&raw[4..36])?,
            frequency: decode_fixed_str(&raw[36..68])?,
            saving: i32::from_le_bytes(raw[68..72].try_into().unwrap()),
            can_use: i32::from_le_bytes(raw[72..76].try_into().unwrap()) != 0,
        })
    }

    fn encode_one(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(RECORD_SIZE);
        buf.extend_from_slice(&self.position.to_le_bytes());
        buf.extend_from_slice(&encode_fixed_str(&self.freq_name, 32)?);
        buf.extend_from_slice(&encode_fixed_str(&self.frequency, 32)?);
        buf.extend_from_slice(&self.saving.to_le_bytes());
        buf.extend_from_slice(&(self.can_use as i32).to_le_bytes());
        Ok(buf)
    }

    /// Parse a base64 body containing zero or more concatenated records.
    pub fn decode_all(encoded: &str) -> Result<Vec<Self>> {
        decode_records(encoded, RECORD_SIZE)?
            .iter()
            .map(|raw| Self::decode_one(raw))
            .collect()
    }

    /// Encode a batch of records into one base64 body.
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
        let entry = FreqBtnInfo {
            position: 1,
            freq_name: "VHF1".to_string(),
            frequency: "131.610".to_string(),
            saving: 0,
            can_use: true,
        };
        let encoded = FreqBtnInfo::encode_all(std::slice::from_ref(&entry)).unwrap();
        let decoded = FreqBtnInfo::decode_all(&encoded).unwrap();
        assert_eq!(decoded, vec![entry]);
    }

    #[test]
    fn rejects_body_not_a_multiple_of_record_size() {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        let bad = STANDARD.encode([0u8; 10]);
        assert!(FreqBtnInfo::decode_all(&bad).is_err());
    }

    #[test]
    fn decodes_multiple_entries() {
        let entries = vec![
            FreqBtnInfo {
                position: 0,
                freq_name: "A".to_string(),
                frequency: "121.500".to_string(),
                saving: 1,
                can_use: true,
            },
            FreqBtnInfo {
                position: 1,
                freq_name: "B".to_string(),
                frequency: "121.600".to_string(),
                saving: 0,
                can_use: false,
            },
        ];
        let encoded = FreqBtnInfo::encode_all(&entries).unwrap();
        let decoded = FreqBtnInfo::decode_all(&encoded).unwrap();
        assert_eq!(decoded, entries);
    }
}
