//! The canned-reply fixture loader (SPEC_FULL.md §4.6), grounded in
//! `original_source/server.py`'s `self.data = json.load(...)`.
//!
//! The fixture is a JSON object keyed by subject, each value itself a JSON
//! object of named fragments. We keep fragment insertion order per subject
//! — `response_frequency_btn`/`response_radio_btn`'s CSeq assignment
//! depends on it — by walking `serde_json::Value::Object` with the
//! `preserve_order` feature enabled rather than collecting into a
//! `HashMap`.

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Canned reply fragments, grouped by subject and kept in fixture
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct CannedReplyStore {
    subjects: std::collections::HashMap<String, Vec<(String, String)>>,
}

impl CannedReplyStore {
    /// Parse a fixture already read into memory.
    pub fn from_str(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json).map_err(|e| Error::Fixture(e.to_string()))?;
        let Value::Object(top) = root else {
            return Err(Error::Fixture("fixture root must be a JSON object".to_string()));
        };

        let mut subjects = std::collections::HashMap::with_capacity(top.len());
        for (subject, fragments) in top {
            let Value::Object(fragment_map) = fragments else {
                return Err(Error::Fixture(format!("subject \"{subject}\" must map to an object")));
            };
            let mut entries = Vec::with_capacity(fragment_map.len());
            for (name, value) in fragment_map {
                let Value::String(body) = value else {
                    return Err(Error::Fixture(format!(
                        "{subject}.{name} must be a base64 string"
                    )));
                };
                entries.push((name, body));
            }
            subjects.insert(subject, entries);
        }
        Ok(Self { subjects })
    }

    /// Load and parse a fixture file (spec.md §6 "canned server replies").
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// The fragments recorded for `subject`, in fixture insertion order.
    /// Empty (not an error) if the subject is absent.
    pub fn fragments(&self, subject: &str) -> &[(String, String)] {
        self.subjects.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }
}
