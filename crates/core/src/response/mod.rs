//! APDU response definitions
//!
//! A response is the payload followed by the two status bytes SW1 SW2.
//! Anything shorter than two bytes cannot be split and is reported as a
//! transport failure.

pub mod status;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::transport::TransportError;
use status::StatusWord;

/// Basic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data
    payload: Bytes,
    /// Status word
    status: StatusWord,
}

impl Response {
    /// Parse response from raw bytes (including status word)
    ///
    /// # Errors
    /// Returns [`TransportError::IncompleteResponse`] if fewer than two bytes
    /// were received.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TransportError> {
        let (status, payload) = extract_status_and_payload(data)?;

        trace!(
            sw1 = format_args!("{:#04x}", status.sw1),
            sw2 = format_args!("{:#04x}", status.sw2),
            payload_len = payload.len(),
            "Parsed APDU response"
        );

        Ok(Self {
            payload: Bytes::copy_from_slice(payload),
            status,
        })
    }

    /// Get the response payload data
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Get the status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// Check if the response indicates success
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Split raw response data into its status word and payload
fn extract_status_and_payload(data: &[u8]) -> Result<(StatusWord, &[u8]), TransportError> {
    let len = data.len();
    if len < 2 {
        debug!("Response too short: {} bytes", len);
        return Err(TransportError::IncompleteResponse(len));
    }

    let status = StatusWord::new(data[len - 2], data[len - 1]);
    Ok((status, &data[..len - 2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_bytes() {
        let resp = Response::from_bytes(&[0x12, 0x34, 0x56, 0x78, 0x90, 0x90, 0x00]).unwrap();
        assert_eq!(resp.payload().as_ref(), &[0x12, 0x34, 0x56, 0x78, 0x90]);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
        assert!(resp.is_success());

        let resp = Response::from_bytes(&[0x6A, 0x82]).unwrap();
        assert!(resp.payload().is_empty());
        assert!(!resp.is_success());
    }

    #[test]
    fn test_short_response_is_transport_error() {
        assert_eq!(
            Response::from_bytes(&[0x90]),
            Err(TransportError::IncompleteResponse(1))
        );
        assert_eq!(
            Response::from_bytes(&[]),
            Err(TransportError::IncompleteResponse(0))
        );
    }
}
