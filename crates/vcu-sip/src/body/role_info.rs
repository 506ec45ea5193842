//! `RoleInfo` (736B fixed, not a repeating record), grounded in
//! `original_source/message_decoder/role_info_decoder.py`.
//!
//! Unlike the other catalog bodies this is a single structure per message:
//! 4 fixed 32-byte channel names, then a 480-byte `+`-joined role list,
//! then a 128-byte `+`-joined "other choosable role" list.

use crate::error::{Error, Result};

use super::decode_fixed_str;

const CHANNEL_COUNT: usize = 4;
const CHANNEL_LEN: usize = 32;
const ROLES_LEN: usize = 480;
const OTHER_LEN: usize = 128;
const RECORD_SIZE: usize = CHANNEL_COUNT * CHANNEL_LEN + ROLES_LEN + OTHER_LEN;

/// The role/channel catalog carried in a single INFO response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    pub channels: [String; CHANNEL_COUNT],
    pub roles: Vec<String>,
    pub other_choose_roles: Vec<String>,
}

impl RoleInfo {
    /// Decode the single base64 body into a `RoleInfo`.
    pub fn decode(encoded: &str) -> Result<Self> {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Base64(e.to_string()))?;

        if decoded.len() != RECORD_SIZE {
            return Err(Error::BodyLengthMismatch {
                actual: decoded.len(),
                record_size: RECORD_SIZE,
            });
        }

        let mut channels: [String; CHANNEL_COUNT] = Default::default();
        for (i, slot) in channels.iter_mut().enumerate() {
            let start = i * CHANNEL_LEN;
            *slot = decode_fixed_str(&decoded[start..start + CHANNEL_LEN])?;
        }

        let roles_start = CHANNEL_COUNT * CHANNEL_LEN;
        let other_start = roles_start + ROLES_LEN;

        let roles_str = decode_fixed_str(&decoded[roles_start..other_start])?;
        let roles = if roles_str.is_empty() {
            Vec::new()
        } else {
            roles_str.split('+').map(str::to_string).collect()
        };

        let other_str = decode_fixed_str(&decoded[other_start..other_start + OTHER_LEN])?;
        let other_choose_roles = if other_str.is_empty() {
            Vec::new()
        } else {
            other_str.split('+').map(str::to_string).collect()
        };

        Ok(RoleInfo {
            channels,
            roles,
            other_choose_roles,
        })
    }

    /// Encode into the fixed-size base64 body.
    pub fn encode(&self) -> Result<String> {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;

        let mut buf = vec![0u8; RECORD_SIZE];

        for (i, channel) in self.channels.iter().enumerate() {
            if channel.len() > CHANNEL_LEN {
                return Err(Error::InvalidText);
            }
            let start = i * CHANNEL_LEN;
            buf[start..start + channel.len()].copy_from_slice(channel.as_bytes());
        }

        let roles_joined = self.roles.join("+");
        if roles_joined.len() > ROLES_LEN {
            return Err(Error::InvalidText);
        }
        let roles_start = CHANNEL_COUNT * CHANNEL_LEN;
        buf[roles_start..roles_start + roles_joined.len()].copy_from_slice(roles_joined.as_bytes());

        let other_joined = self.other_choose_roles.join("+");
        if other_joined.len() > OTHER_LEN {
            return Err(Error::InvalidText);
        }
        let other_start = roles_start + ROLES_LEN;
        buf[other_start..other_start + other_joined.len()].copy_from_slice(other_joined.as_bytes());

        Ok(STANDARD.encode(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RoleInfo {
        RoleInfo {
            channels: [
                "316".to_string(),
                "317".to_string(),
                "318".to_string(),
                "319".to_string(),
            ],
            roles: vec!["12:OP".to_string()],
            other_choose_roles: Vec::new(),
        }
    }

    #[test]
    fn roundtrips_channels_and_roles() {
        let info = sample();
        let encoded = info.encode().unwrap();
        let decoded = RoleInfo::decode(&encoded).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn empty_other_choose_roles_decodes_to_empty_vec() {
        let info = sample();
        let encoded = info.encode().unwrap();
        let decoded = RoleInfo::decode(&encoded).unwrap();
        assert!(decoded.other_choose_roles.is_empty());
    }

    #[test]
    fn multi_role_plus_joined_list_splits_correctly() {
        let mut info = sample();
        info.roles = vec!["OP".to_string(), "DISPATCH".to_string(), "SUPERVISOR".to_string()];
        let encoded = info.encode().unwrap();
        let decoded = RoleInfo::decode(&encoded).unwrap();
        assert_eq!(decoded.roles, info.roles);
    }

    #[test]
    fn rejects_wrong_total_length() {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        let bad = STANDARD.encode([0u8; 100]);
        assert!(RoleInfo::decode(&bad).is_err());
    }
}
