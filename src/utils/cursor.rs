//! Continuation cursor codec.
//!
//! A cursor names the id of the last user on the previous page. Clients
//! treat it as an opaque string and echo it back in `continuationToken`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Continuation token is not valid base64")]
    Encoding,
    #[error("Continuation token does not name a user")]
    Payload,
}

/// Encodes the id of the last returned user.
pub fn encode(last_id: i64) -> String {
    URL_SAFE_NO_PAD.encode(last_id.to_string())
}

/// Decodes a cursor back into the id to resume after.
pub fn decode(cursor: &str) -> Result<i64, CursorError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor.trim())
        .map_err(|_| CursorError::Encoding)?;
    let text = String::from_utf8(bytes).map_err(|_| CursorError::Payload)?;
    text.parse::<i64>().map_err(|_| CursorError::Payload)
}
