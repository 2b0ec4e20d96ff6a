use async_trait::async_trait;
use serde::Deserialize;

use stockledger_inventory::Snapshot;

use super::{GatewayError, PersistenceGateway};

/// Client for a remote backend exposing `GET /api/data` and `POST /api/save`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SaveAck {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(GatewayError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn load(&self) -> Result<Snapshot, GatewayError> {
        let resp = self.client.get(self.url("/api/data")).send().await.map_err(transport)?;
        ensure_success(resp).await?.json().await.map_err(transport)
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        let resp = self
            .client
            .post(self.url("/api/save"))
            .json(snapshot)
            .send()
            .await
            .map_err(transport)?;
        let status = resp.status().as_u16();
        let ack: SaveAck = ensure_success(resp).await?.json().await.map_err(transport)?;
        if !ack.success {
            return Err(GatewayError::Rejected {
                status,
                message: ack.error.unwrap_or_else(|| "save not acknowledged".to_string()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let gw = HttpGateway::new("http://localhost:8080/");
        assert_eq!(gw.url("/api/data"), "http://localhost:8080/api/data");
    }
}
