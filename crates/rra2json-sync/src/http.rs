//! HTTP sinks: the service map and the event bus.

use async_trait::async_trait;
use rra2json_core::RraRecord;
use tracing::info;

use crate::event::event_envelope;
use crate::{Delivery, Sink, SyncError};

/// Turn a non-2xx response into [`SyncError::Server`].
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Server {
        status: status.as_u16(),
        body,
    })
}

/// Client for the service map's RRA update endpoint.
pub struct ServiceMapClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ServiceMapClient {
    /// `base_url` is like `https://servicemap.example`; a trailing slash is dropped.
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn update_url(&self) -> String {
        format!("{}/api/v1/rra/update", self.base_url)
    }
}

#[async_trait]
impl Sink for ServiceMapClient {
    fn name(&self) -> &'static str {
        "service_map"
    }

    async fn deliver(&self, record: &RraRecord) -> Result<Delivery, SyncError> {
        let url = self.update_url();
        info!(url = %url, service = %record.service(), "posting RRA to service map");
        let mut req = self.client.post(&url).json(record);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        check_status(req.send().await?).await?;
        Ok(Delivery { target: url })
    }
}

/// Client for the event bus's HTTP intake.
pub struct EventBusClient {
    client: reqwest::Client,
    url: String,
}

impl EventBusClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Sink for EventBusClient {
    fn name(&self) -> &'static str {
        "event_bus"
    }

    async fn deliver(&self, record: &RraRecord) -> Result<Delivery, SyncError> {
        let envelope = event_envelope(record)?;
        info!(url = %self.url, service = %record.service(), "publishing RRA event");
        let resp = self.client.post(&self.url).json(&envelope).send().await?;
        check_status(resp).await?;
        Ok(Delivery {
            target: self.url.clone(),
        })
    }
}

/// One-request-per-connection HTTP stub on 127.0.0.1.
#[cfg(test)]
pub(crate) mod stub {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    pub fn reply(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    /// Answer each incoming request with the next canned response.
    /// The handle yields the raw requests in arrival order.
    pub async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for response in responses {
                let (mut sock, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    let n = sock.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(end) = header_end(&buf) {
                        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                        let len = head
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if buf.len() >= end + 4 + len {
                            break;
                        }
                    }
                }
                sock.write_all(response.as_bytes()).await.unwrap();
                let _ = sock.shutdown().await;
                seen.push(String::from_utf8_lossy(&buf).into_owned());
            }
            seen
        });
        (url, handle)
    }
}
