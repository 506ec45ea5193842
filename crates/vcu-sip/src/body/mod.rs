//! Binary catalog record codecs (spec.md §4.1), grounded in
//! `original_source/message_decoder/{freq,radio,tel,fun,role}_*_decoder.py`.
//!
//! Each record type mirrors a little-endian C struct, base64-framed on the
//! wire inside a SIP body. `decode_records` below walks a flat byte buffer
//! in fixed-size chunks the way the originals' `ctypes.memmove` loop does.

pub mod freq_btn;
pub mod fun_btn;
pub mod radio_info;
pub mod role_info;
pub mod tel_btn;

pub use freq_btn::FreqBtnInfo;
pub use fun_btn::FunBtnInfo;
pub use radio_info::RadioInfo;
pub use role_info::RoleInfo;
pub use tel_btn::TelBtnInfo;

use crate::error::{Error, Result};

/// Decode a fixed-width ASCII field, trimming trailing NUL padding the way
/// the originals' `.decode('ascii').strip('\x00')` does.
pub(crate) fn decode_fixed_str(bytes: &[u8]) -> Result<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end])
        .map(|s| s.to_string())
        .map_err(|_| Error::InvalidText)
}

/// Encode a string into a fixed-width NUL-padded field, erroring if it
/// doesn't fit.
pub(crate) fn encode_fixed_str(s: &str, width: usize) -> Result<Vec<u8>> {
    if s.len() > width {
        return Err(Error::InvalidText);
    }
    let mut buf = vec![0u8; width];
    buf[..s.len()].copy_from_slice(s.as_bytes());
    Ok(buf)
}

/// Base64-decode a body and split it into fixed-size records, erroring if
/// the decoded length isn't a whole multiple of `record_size`
/// (spec.md §4.1's length-validation requirement).
pub(crate) fn decode_records(encoded: &str, record_size: usize) -> Result<Vec<Vec<u8>>> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Base64(e.to_string()))?;

    if decoded.len() % record_size != 0 {
        return Err(Error::BodyLengthMismatch {
            actual: decoded.len(),
            record_size,
        });
    }

    Ok(decoded.chunks(record_size).map(|c| c.to_vec()).collect())
}

/// Base64-encode a sequence of fixed-size records concatenated end to end.
pub(crate) fn encode_records(records: &[Vec<u8>]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let mut buf = Vec::with_capacity(records.iter().map(Vec::len).sum());
    for record in records {
        buf.extend_from_slice(record);
    }
    STANDARD.encode(buf)
}
