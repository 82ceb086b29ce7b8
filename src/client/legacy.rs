use async_trait::async_trait;
use hyper::header::CONTENT_TYPE;
use hyper::{Body as HyperBody, Request};
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::{resolve_uri, send_and_read, HttpsClient, Transport};
use crate::error::TransportError;
use crate::models::request_model::{HttpMethod, RequestDescriptor};

/// Options in the shape the host page request call takes. `data` stays a raw
/// JSON value until the request is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRequestOptions {
    pub content_type: &'static str,
    #[serde(rename = "type")]
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<&RequestDescriptor> for HostRequestOptions {
    fn from(descriptor: &RequestDescriptor) -> Self {
        Self {
            content_type: "application/json",
            method: descriptor.method,
            data: descriptor.body.clone(),
        }
    }
}

/// Legacy host page transport. Non-2xx responses take the error path.
pub struct LegacyHostTransport {
    client: HttpsClient,
    base_url: String,
}

impl LegacyHostTransport {
    pub fn new(client: HttpsClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for LegacyHostTransport {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<(), TransportError> {
        let options = HostRequestOptions::from(descriptor);
        let uri = resolve_uri(&self.base_url, &descriptor.url)?;

        let body = match &options.data {
            Some(data) => HyperBody::from(serde_json::to_vec(data)?),
            None => HyperBody::empty(),
        };

        let request = Request::builder()
            .method(hyper::Method::from(options.method))
            .uri(uri)
            .header(CONTENT_TYPE, options.content_type)
            .body(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let (status, body) = send_and_read(&self.client, request).await?;
        if !status.is_success() {
            warn!(url = %descriptor.url, status = status.as_u16(), "host request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        debug!(url = %descriptor.url, status = status.as_u16(), "host request completed");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "legacy-host"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_client;
    use crate::client::test_support::spawn_fake_jira;
    use serde_json::json;

    #[test]
    fn options_keep_raw_data() {
        let descriptor = RequestDescriptor {
            url: "/rest/api/3/issue".to_string(),
            method: HttpMethod::POST,
            body: Some(json!({"a": 1})),
        };
        let options = HostRequestOptions::from(&descriptor);
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"contentType": "application/json", "type": "POST", "data": {"a": 1}})
        );
    }

    #[tokio::test]
    async fn sends_content_type_and_data() {
        let (base, recorded) = spawn_fake_jira().await;
        let transport = LegacyHostTransport::new(build_client(), &base);
        let descriptor = RequestDescriptor {
            url: "/rest/api/3/issue".to_string(),
            method: HttpMethod::POST,
            body: Some(json!({"a": 1})),
        };

        transport.send(&descriptor).await.unwrap();

        let seen = recorded.lock().unwrap();
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
        assert_eq!(seen[0].accept, None);
        assert_eq!(seen[0].body, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn error_status_rejects() {
        let (base, _) = spawn_fake_jira().await;
        let transport = LegacyHostTransport::new(build_client(), &base);
        let descriptor = RequestDescriptor {
            url: "/status/500".to_string(),
            method: HttpMethod::GET,
            body: None,
        };

        let err = transport.send(&descriptor).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Status { status: 500, ref body } if body == "boom"
        ));
    }
}
