//! Hexadecimal codec and SELECT APDU construction
//!
//! Every log line that carries bytes goes through [`bytes_to_hex`], so the
//! uppercase, zero-padded form is what the application sees.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Error, Result};

/// Convert a hexadecimal string into bytes, most significant nibble first.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] for odd-length input or non-hex characters.
pub fn hex_to_bytes(s: &str) -> Result<Bytes> {
    hex::decode(s).map(Bytes::from).map_err(|e| match e {
        hex::FromHexError::OddLength => {
            Error::invalid_argument(format!("odd-length hex string ({} chars)", s.len()))
        }
        other => Error::invalid_argument(format!("malformed hex string: {other}")),
    })
}

/// Convert bytes to an uppercase hexadecimal string, two characters per byte.
pub fn bytes_to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_upper(bytes)
}

/// Build `header || Lc || aid` from hexadecimal header and AID strings.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if either string is not valid hex or
/// the AID does not fit a short Lc byte.
pub fn build_select_apdu(header_hex: &str, aid_hex: &str) -> Result<Bytes> {
    let header = hex_to_bytes(header_hex)?;
    let aid = hex_to_bytes(aid_hex)?;
    let lc = u8::try_from(aid.len())
        .map_err(|_| Error::invalid_argument(format!("AID too long: {} bytes", aid.len())))?;

    let mut buffer = BytesMut::with_capacity(header.len() + 1 + aid.len());
    buffer.put_slice(&header);
    buffer.put_u8(lc);
    buffer.put_slice(&aid);
    Ok(buffer.freeze())
}
