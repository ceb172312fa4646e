use std::future::Future;

use devices_core::{decode_devices_payload, Collection};
use reqwest::header::ACCEPT;

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::limits::read_body_with_limit;

/// Something that can produce the device collection.
pub trait DeviceSource: Send + Sync + 'static {
    fn fetch_devices(&self) -> impl Future<Output = Result<Collection, FetchError>> + Send;
}

/// `GET {base}/devices` over HTTP(S).
#[derive(Clone, Debug)]
pub struct HttpDeviceSource {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpDeviceSource {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    async fn get_devices(&self) -> Result<Collection, FetchError> {
        let url = self.config.devices_url();
        log::debug!("GET {url}");

        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = read_body_with_limit(&mut response, self.config.max_body_bytes()).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(decode_devices_payload(&text)?)
    }
}

impl DeviceSource for HttpDeviceSource {
    fn fetch_devices(&self) -> impl Future<Output = Result<Collection, FetchError>> + Send {
        self.get_devices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single HTTP response and return the base URL plus the raw request line.
    async fn serve_once(
        status_line: &'static str,
        body: Vec<u8>,
        include_content_length: bool,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let Ok((mut socket, _peer)) = listener.accept().await else {
                return String::new();
            };

            let mut buf = [0u8; 1024];
            let mut req = Vec::new();
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        req.extend_from_slice(&buf[..n]);
                        if req.windows(4).any(|w| w == b"\r\n\r\n") || req.len() > 16 * 1024 {
                            break;
                        }
                    }
                }
            }

            let mut headers = format!("HTTP/1.1 {status_line}\r\n");
            headers.push_str("Content-Type: application/json\r\n");
            headers.push_str("Connection: close\r\n");
            if include_content_length {
                headers.push_str(&format!("Content-Length: {}\r\n", body.len()));
            }
            headers.push_str("\r\n");

            // The client may stop reading early once it hits the size cap.
            let _ = socket.write_all(headers.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&req)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (format!("http://{addr}/api"), handle)
    }

    fn source(base: &str) -> HttpDeviceSource {
        HttpDeviceSource::new(ClientConfig::new(base).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_decodes_devices() {
        let body = br#"{"devices":[{"_id":"abc123","name":"fan"}]}"#.to_vec();
        let (base, server) = serve_once("200 OK", body, true).await;

        let devices = source(&base).fetch_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].get("_id"), Some(&serde_json::json!("abc123")));

        let request_line = server.await.unwrap();
        assert_eq!(request_line, "GET /api/devices HTTP/1.1");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, server) = serve_once("500 Internal Server Error", b"oops".to_vec(), true).await;

        let err = source(&base).fetch_devices().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500 }), "{err:?}");
        assert_eq!(err.to_string(), "request failed with status code 500");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error() {
        let (base, server) = serve_once("200 OK", br#"{"items":[]}"#.to_vec(), true).await;

        let err = source(&base).fetch_devices().await.unwrap_err();
        assert!(matches!(err, FetchError::Payload(_)), "{err:?}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn oversized_body_without_content_length_is_rejected() {
        let mut body = br#"{"devices":["#.to_vec();
        body.extend(std::iter::repeat(b' ').take(256));
        body.extend_from_slice(b"]}");
        let (base, _server) = serve_once("200 OK", body, false).await;

        let config = ClientConfig::new(&base).unwrap().with_max_body_bytes(64);
        let err = HttpDeviceSource::new(config)
            .unwrap()
            .fetch_devices()
            .await
            .unwrap_err();
        assert!(
            matches!(err, FetchError::BodyTooLarge { limit: 64, received: 65 }),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source(&format!("http://{addr}/"))
            .fetch_devices()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "{err:?}");
    }
}
