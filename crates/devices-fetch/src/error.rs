use devices_core::PayloadError;

/// Any failure to obtain the device collection.
///
/// The `Display` text is what ends up in the user-facing alert, after the fixed prefix.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),
    #[error("request failed with status code {status}")]
    Status { status: u16 },
    #[error("response body too large (limit {limit} bytes, received {received} bytes)")]
    BodyTooLarge { limit: usize, received: u64 },
    #[error("malformed devices payload: {0}")]
    Payload(#[from] PayloadError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Status {
                status: status.as_u16(),
            };
        }
        FetchError::Transport(err.to_string())
    }
}
