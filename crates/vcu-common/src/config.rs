//! Endpoint configuration.
//!
//! The wire format and session state machines never read configuration
//! files directly — they are handed an already-validated [`EndpointConfig`].
//! Loading it from a TOML file or a flat key-value map is this module's job
//! (the external collaborator seam spec.md §6 calls out).

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Recognized configuration keys (spec.md §6), as used by [`EndpointConfig::from_map`].
pub const KEY_CLIENT_IP: &str = "client.ip";
pub const KEY_CLIENT_PORT: &str = "client.port";
pub const KEY_CLIENT_RTP_PORT: &str = "client.rtp_port";
pub const KEY_SERVER_IP: &str = "server.ip";
pub const KEY_SERVER_PORT: &str = "server.port";
pub const KEY_SERVER_RTP_PORT: &str = "server.rtp_port";

/// Default single-in-flight retransmission timeout (spec.md §4.2).
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of retransmissions before a transaction is abandoned.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default RMS voice-activity threshold (`original_source/rtp/rtp_endpoint.py`).
pub const DEFAULT_VOICE_THRESHOLD: i32 = 100;

/// Immutable, post-init endpoint configuration (spec.md §3 "Endpoint config").
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Local SIP listen address
    pub local_ip: IpAddr,
    /// Local SIP listen port
    pub local_port: u16,
    /// Remote peer's SIP address
    pub remote_ip: IpAddr,
    /// Remote peer's SIP port
    pub remote_port: u16,
    /// Local RTP listen port
    pub local_rtp_port: u16,
    /// Remote peer's RTP port (may be superseded by a negotiated SDP port)
    pub remote_rtp_port: u16,
    /// The seat/channel identity this endpoint authenticates as
    pub local_user: String,

    /// Retransmission timeout before a retry is attempted
    #[serde(default = "default_retry_timeout_secs")]
    pub retry_timeout_secs: u64,
    /// Maximum number of retransmissions before a transaction is abandoned
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// RMS threshold above which an RTP frame is marked as voice-active
    #[serde(default = "default_voice_threshold")]
    pub voice_threshold: i32,
}

fn default_retry_timeout_secs() -> u64 {
    DEFAULT_RETRY_TIMEOUT.as_secs()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_voice_threshold() -> i32 {
    DEFAULT_VOICE_THRESHOLD
}

impl EndpointConfig {
    /// Retransmission timeout as a [`Duration`].
    pub fn retry_timeout(&self) -> Duration {
        Duration::from_secs(self.retry_timeout_secs)
    }

    /// Build a config from the flat key-value map described in spec.md §6.
    ///
    /// `local_user` is not part of the recognized key set (it names the
    /// seat, not a transport endpoint) and is supplied separately.
    pub fn from_map(map: &HashMap<String, String>, local_user: impl Into<String>) -> Result<Self> {
        let get = |key: &str| -> Result<&String> {
            map.get(key)
                .ok_or_else(|| Error::MissingKey(key.to_string()))
        };
        let parse_ip = |key: &str| -> Result<IpAddr> {
            get(key)?
                .parse()
                .map_err(|e| Error::InvalidValue {
                    key: key.to_string(),
                    message: format!("{e}"),
                })
        };
        let parse_port = |key: &str| -> Result<u16> {
            get(key)?
                .parse()
                .map_err(|e| Error::InvalidValue {
                    key: key.to_string(),
                    message: format!("{e}"),
                })
        };

        Ok(EndpointConfig {
            local_ip: parse_ip(KEY_CLIENT_IP)?,
            local_port: parse_port(KEY_CLIENT_PORT)?,
            remote_ip: parse_ip(KEY_SERVER_IP)?,
            remote_port: parse_port(KEY_SERVER_PORT)?,
            local_rtp_port: parse_port(KEY_CLIENT_RTP_PORT)?,
            remote_rtp_port: parse_port(KEY_SERVER_RTP_PORT)?,
            local_user: local_user.into(),
            retry_timeout_secs: DEFAULT_RETRY_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            voice_threshold: DEFAULT_VOICE_THRESHOLD,
        })
    }

    /// Build a config for the server side of the pair: the server's own
    /// `server.*` keys become its local endpoint, the client's `client.*`
    /// keys become the remote endpoint it talks to.
    pub fn from_map_server(map: &HashMap<String, String>, local_user: impl Into<String>) -> Result<Self> {
        let get = |key: &str| -> Result<&String> {
            map.get(key)
                .ok_or_else(|| Error::MissingKey(key.to_string()))
        };
        let parse_ip = |key: &str| -> Result<IpAddr> {
            get(key)?
                .parse()
                .map_err(|e| Error::InvalidValue { key: key.to_string(), message: format!("{e}") })
        };
        let parse_port = |key: &str| -> Result<u16> {
            get(key)?
                .parse()
                .map_err(|e| Error::InvalidValue { key: key.to_string(), message: format!("{e}") })
        };

        Ok(EndpointConfig {
            local_ip: parse_ip(KEY_SERVER_IP)?,
            local_port: parse_port(KEY_SERVER_PORT)?,
            remote_ip: parse_ip(KEY_CLIENT_IP)?,
            remote_port: parse_port(KEY_CLIENT_PORT)?,
            local_rtp_port: parse_port(KEY_SERVER_RTP_PORT)?,
            remote_rtp_port: parse_port(KEY_CLIENT_RTP_PORT)?,
            local_user: local_user.into(),
            retry_timeout_secs: DEFAULT_RETRY_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            voice_threshold: DEFAULT_VOICE_THRESHOLD,
        })
    }

    /// Load from a TOML file using the `config` crate, layered so that
    /// environment variables prefixed `VCU_` can override individual
    /// fields (e.g. `VCU_LOCAL_PORT=5070`).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("VCU").separator("_"))
            .build()
            .map_err(|e| Error::Load(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Load(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> HashMap<String, String> {
        HashMap::from([
            (KEY_CLIENT_IP.to_string(), "127.0.0.1".to_string()),
            (KEY_CLIENT_PORT.to_string(), "5060".to_string()),
            (KEY_CLIENT_RTP_PORT.to_string(), "16387".to_string()),
            (KEY_SERVER_IP.to_string(), "127.0.0.1".to_string()),
            (KEY_SERVER_PORT.to_string(), "5061".to_string()),
            (KEY_SERVER_RTP_PORT.to_string(), "16386".to_string()),
        ])
    }

    #[test]
    fn from_map_builds_client_config() {
        let cfg = EndpointConfig::from_map(&sample_map(), "bxp").unwrap();
        assert_eq!(cfg.local_port, 5060);
        assert_eq!(cfg.remote_port, 5061);
        assert_eq!(cfg.local_rtp_port, 16387);
        assert_eq!(cfg.remote_rtp_port, 16386);
        assert_eq!(cfg.local_user, "bxp");
        assert_eq!(cfg.retry_timeout(), DEFAULT_RETRY_TIMEOUT);
    }

    #[test]
    fn from_map_server_swaps_local_and_remote() {
        let cfg = EndpointConfig::from_map_server(&sample_map(), "bxp").unwrap();
        assert_eq!(cfg.local_port, 5061);
        assert_eq!(cfg.remote_port, 5060);
    }

    #[test]
    fn from_map_missing_key_fails_cleanly() {
        let mut map = sample_map();
        map.remove(KEY_SERVER_PORT);
        let err = EndpointConfig::from_map(&map, "bxp").unwrap_err();
        assert!(matches!(err, Error::MissingKey(_)));
    }

    #[test]
    fn from_file_loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comm_config.toml");
        std::fs::write(
            &path,
            r#"
            local_ip = "127.0.0.1"
            local_port = 5060
            remote_ip = "127.0.0.1"
            remote_port = 5061
            local_rtp_port = 16387
            remote_rtp_port = 16386
            local_user = "bxp"
            "#,
        )
        .unwrap();

        let cfg = EndpointConfig::from_file(&path).unwrap();
        assert_eq!(cfg.local_user, "bxp");
        assert_eq!(cfg.max_retries, DEFAULT_MAX_RETRIES);
    }
}
