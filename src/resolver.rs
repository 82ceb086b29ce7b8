use actix_web::{web, HttpResponse};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body as HyperBody, Request};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::client::{resolve_uri, send_and_read, HttpsClient};
use crate::error::{ResolverError, TransportError};
use crate::models::request_model::HttpMethod;
use crate::state::AppState;

const API_PREFIX: &str = "/rest/api/3/";

#[derive(Debug, Deserialize, Clone)]
pub struct ResolverPayload {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub body: Option<Value>,
}

pub async fn resolver_handler(
    state: web::Data<AppState>,
    payload: web::Json<ResolverPayload>,
) -> Result<HttpResponse, ResolverError> {
    let payload = payload.into_inner();
    let value = forward(&state.client, &state.config.jira_base_url, &payload).await?;
    Ok(HttpResponse::Ok().json(value))
}

/// Forwards one payload to the REST API and returns the parsed body. An empty
/// body comes back as `null`, a non-JSON body as a string.
pub async fn forward(
    client: &HttpsClient,
    base_url: &str,
    payload: &ResolverPayload,
) -> Result<Value, ResolverError> {
    check_relative_path(&payload.url)?;

    let path = format!("{}{}", API_PREFIX, payload.url.trim_start_matches('/'));
    let uri = resolve_uri(base_url, &path).map_err(|e| ResolverError::BadRequest(e.to_string()))?;

    let base_path = Url::parse(base_url)
        .map_err(|e| ResolverError::BadRequest(e.to_string()))?
        .path()
        .trim_end_matches('/')
        .to_string();
    if !uri.path().starts_with(&format!("{}{}", base_path, API_PREFIX)) {
        return Err(ResolverError::BadRequest(format!(
            "path escapes {}: {}",
            API_PREFIX, payload.url
        )));
    }

    // String bodies are passed through as-is.
    let body = match &payload.body {
        None | Some(Value::Null) => HyperBody::empty(),
        Some(Value::String(raw)) => HyperBody::from(raw.clone()),
        Some(other) => HyperBody::from(serde_json::to_vec(other).map_err(TransportError::from)?),
    };

    let request = Request::builder()
        .method(hyper::Method::from(payload.method))
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .body(body)
        .map_err(|e| ResolverError::BadRequest(e.to_string()))?;

    let (status, bytes) = send_and_read(client, request).await?;
    info!(
        path = %path,
        method = %payload.method,
        status = status.as_u16(),
        "resolver request forwarded"
    );

    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}

/// Rejects `.` and `..` segments, plain or percent-encoded, so the request
/// stays under the API prefix.
fn check_relative_path(url: &str) -> Result<(), ResolverError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let escapes = path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    });

    if escapes {
        return Err(ResolverError::BadRequest(format!(
            "path escapes {}: {}",
            API_PREFIX, url
        )));
    }
    Ok(())
}
