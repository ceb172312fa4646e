//! Response size cap for the devices endpoint.

use crate::error::FetchError;

pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024; // 10 MiB

/// Read a response body into memory, failing once it exceeds `limit_bytes`.
///
/// An advertised `Content-Length` above the limit fails before any of the body is read.
pub(crate) async fn read_body_with_limit(
    response: &mut reqwest::Response,
    limit_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(content_length) = response.content_length() {
        if content_length > limit_bytes as u64 {
            log::warn!("devices response advertises {content_length} bytes (limit {limit_bytes})");
            return Err(FetchError::BodyTooLarge {
                limit: limit_bytes,
                received: content_length,
            });
        }
    }

    let max_bytes = limit_bytes.saturating_add(1);
    let mut out: Vec<u8> = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        if out.len().saturating_add(chunk.len()) >= max_bytes {
            log::warn!("devices response exceeded {limit_bytes} bytes");
            return Err(FetchError::BodyTooLarge {
                limit: limit_bytes,
                received: max_bytes as u64,
            });
        }
        out.extend_from_slice(&chunk);
    }

    Ok(out)
}
