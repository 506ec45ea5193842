//! `FunBtnInfo` (40B), grounded in
//! `original_source/message_decoder/fun_btn_info_decoder.py` (`MyFunBtnInfo`).

use crate::error::Result;

use super::{decode_fixed_str, decode_records, encode_fixed_str, encode_records};

const RECORD_SIZE: usize = 40;

/// One function-button catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunBtnInfo {
    pub position: i32,
    pub name: String,
    pub kind: i32,
}

impl FunBtnInfo {
    fn decode_one(raw: &[u8]) -> Result<Self> {
        Ok(FunBtnInfo {
            position: i32::from_le_bytes(raw[0..4].try_into().unwrap()),
            name: decode_fixed_str(&raw[4..36])?,
            kind: i32::from_le_bytes(raw[36..40].try_into().unwrap()),
        })
    }

    fn encode_one(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(RECORD_SIZE);
        buf.extend_from_slice(&self.position.to_le_bytes());
        buf.extend_from_slice(&encode_fixed_str(&self.name, 32)?);
        buf.extend_from_slice(&self.kind.to_le_bytes());
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
        let entry = FunBtnInfo {
            position: 40,
            name: "old".to_string(),
            kind: 2,
        };
        let encoded = FunBtnInfo::encode_all(std::slice::from_ref(&entry)).unwrap();
        let decoded = FunBtnInfo::decode_all(&encoded).unwrap();
        assert_eq!(decoded, vec![entry]);
    }

    #[test]
    fn decodes_multiple_entries_from_one_body() {
        let entries = vec![
            FunBtnInfo { position: 40, name: "old".to_string(), kind: 2 },
            FunBtnInfo { position: 41, name: "new".to_string(), kind: 3 },
        ];
        let encoded = FunBtnInfo::encode_all(&entries).unwrap();
        let decoded = FunBtnInfo::decode_all(&encoded).unwrap();
        assert_eq!(decoded, entries);
    }
}
