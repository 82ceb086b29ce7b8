use async_trait::async_trait;
use hyper::{Body as HyperBody, Request};
use tracing::debug;

use crate::client::{resolve_uri, send_and_read, HttpsClient, Transport};
use crate::error::TransportError;
use crate::models::request_model::{HttpMethod, RequestDescriptor};

/// Request init in the shape the sandbox bridge takes: fixed JSON headers and
/// the body already encoded as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeRequestInit {
    pub method: HttpMethod,
    pub headers: [(&'static str, &'static str); 2],
    pub body: Option<String>,
}

impl BridgeRequestInit {
    pub fn from_descriptor(descriptor: &RequestDescriptor) -> Result<Self, TransportError> {
        let body = match &descriptor.body {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };

        Ok(Self {
            method: descriptor.method,
            headers: [
                ("Accept", "application/json"),
                ("Content-Type", "application/json"),
            ],
            body,
        })
    }
}

/// Sandbox bridge transport. Like `fetch`, any HTTP response counts as a
/// completed call; only network failures are errors.
pub struct BridgeTransport {
    client: HttpsClient,
    base_url: String,
}

impl BridgeTransport {
    pub fn new(client: HttpsClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<(), TransportError> {
        let init = BridgeRequestInit::from_descriptor(descriptor)?;
        let uri = resolve_uri(&self.base_url, &descriptor.url)?;

        let mut builder = Request::builder()
            .method(hyper::Method::from(init.method))
            .uri(uri);
        for (name, value) in init.headers {
            builder = builder.header(name, value);
        }

        let body = init.body.map(HyperBody::from).unwrap_or_else(HyperBody::empty);
        let request = builder
            .body(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let (status, _) = send_and_read(&self.client, request).await?;
        debug!(url = %descriptor.url, status = status.as_u16(), "bridge request completed");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bridge"
    }
}
