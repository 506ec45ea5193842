//! Response correlation (spec.md §4.2 "Correlation", §9 "reject mismatches
//! rather than fall through").

use crate::error::{Error, Result};

/// Whether an inbound response's (subject, content-type) pair matches what
/// the pending request expected. Subjects/content-types are compared
/// case-sensitively, as the dialect's wire grammar is fixed-vocabulary.
pub fn check_subject_match(expected_subject: &str, actual_subject: Option<&str>) -> Result<()> {
    match actual_subject {
        Some(actual) if actual == expected_subject => Ok(()),
        Some(actual) => Err(Error::SubjectMismatch {
            expected: expected_subject.to_string(),
            actual: actual.to_string(),
        }),
        None => Err(Error::SubjectMismatch {
            expected: expected_subject.to_string(),
            actual: "<none>".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_subject_is_ok() {
        assert!(check_subject_match("vcu_radio", Some("vcu_radio")).is_ok());
    }

    #[test]
    fn mismatched_subject_is_rejected() {
        assert!(check_subject_match("vcu_radio", Some("vcu_phone")).is_err());
    }

    #[test]
    fn missing_subject_is_rejected() {
        assert!(check_subject_match("vcu_radio", None).is_err());
    }
}
