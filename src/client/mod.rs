use std::sync::Arc;

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::{Body as HyperBody, Client, Request, StatusCode, Uri};
use hyper_tls::HttpsConnector;
use url::Url;

use crate::config::AppEnvironment;
use crate::error::TransportError;
use crate::models::request_model::RequestDescriptor;

pub mod bridge;
pub mod legacy;
pub mod timed;

pub use bridge::BridgeTransport;
pub use legacy::LegacyHostTransport;
pub use timed::TimedRequest;

pub type HttpsClient = Client<HttpsConnector<HttpConnector>>;

pub fn build_client() -> HttpsClient {
    let https = HttpsConnector::new();
    Client::builder().build::<_, HyperBody>(https)
}

/// Performs one request for a descriptor. Resolves once the response body has
/// been read, so a caller timing `send` measures the whole round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<(), TransportError>;

    fn name(&self) -> &'static str;
}

/// Picks the transport for the hosting environment.
pub fn transport_for(
    environment: AppEnvironment,
    client: HttpsClient,
    base_url: &str,
) -> Arc<dyn Transport> {
    match environment {
        AppEnvironment::Forge => Arc::new(BridgeTransport::new(client, base_url)),
        AppEnvironment::Connect => Arc::new(LegacyHostTransport::new(client, base_url)),
    }
}

/// Joins the site base with a request path. A missing leading `/` is added.
pub fn resolve_uri(base_url: &str, path: &str) -> Result<Uri, TransportError> {
    let path = path.trim();
    let joined = if path.starts_with('/') {
        format!("{}{}", base_url, path)
    } else {
        format!("{}/{}", base_url, path)
    };

    let url = Url::parse(&joined).map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
    url.as_str()
        .parse::<Uri>()
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

/// Sends a prepared request and reads the full body.
pub async fn send_and_read(
    client: &HttpsClient,
    request: Request<HyperBody>,
) -> Result<(StatusCode, Bytes), TransportError> {
    let response = client.request(request).await?;
    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await?;
    Ok((status, body))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use hyper::header::{ACCEPT, CONTENT_TYPE};
    use hyper::service::{make_service_fn, service_fn};
    use hyper::{Body, Request, Response, Server};
    use serde_json::json;

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: String,
        pub path: String,
        pub content_type: Option<String>,
        pub accept: Option<String>,
        pub body: String,
    }

    pub type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

    /// Fake Jira site. `/status/500` fails, `/empty` has no body, `/text`
    /// answers plain text, anything else echoes the request as JSON.
    pub async fn spawn_fake_jira() -> (String, Recorded) {
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
        let seen = recorded.clone();

        let make_svc = make_service_fn(move |_conn| {
            let seen = seen.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle(req, seen.clone())))
            }
        });

        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_svc);
        let addr = server.local_addr();
        tokio::spawn(server);

        (format!("http://{}", addr), recorded)
    }

    async fn handle(req: Request<Body>, seen: Recorded) -> Result<Response<Body>, Infallible> {
        let header = |name: hyper::header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let accept = header(ACCEPT);
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let bytes = hyper::body::to_bytes(req.into_body()).await.unwrap_or_default();
        let body = String::from_utf8_lossy(&bytes).to_string();

        seen.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            content_type,
            accept,
            body: body.clone(),
        });

        let response = if path.ends_with("/status/500") {
            Response::builder().status(500).body(Body::from("boom"))
        } else if path.ends_with("/empty") {
            Response::builder().status(204).body(Body::empty())
        } else if path.ends_with("/text") {
            Response::builder().status(200).body(Body::from("plain text"))
        } else {
            let parsed: serde_json::Value = serde_json::from_str(&body).unwrap_or(json!(null));
            let echo = json!({ "method": method, "path": path, "body": parsed });
            Response::builder()
                .status(200)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(echo.to_string()))
        };

        Ok(response.unwrap())
    }
}
