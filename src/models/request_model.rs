use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FormError;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            _ => Err(FormError::InvalidMethod(s.to_string())),
        }
    }
}

impl From<HttpMethod> for hyper::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => hyper::Method::GET,
            HttpMethod::POST => hyper::Method::POST,
            HttpMethod::PUT => hyper::Method::PUT,
            HttpMethod::DELETE => hyper::Method::DELETE,
        }
    }
}

/// One request, repeated for every call in a batch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

/// Raw form state as submitted by the page.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchForm {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    pub descriptor: RequestDescriptor,
    pub count: usize,
    pub concurrency: usize,
}

impl BatchForm {
    /// Validates the form and builds the batch. Fails before any request is sent.
    pub fn into_plan(
        self,
        default_count: usize,
        default_concurrency: usize,
    ) -> Result<BatchPlan, FormError> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(FormError::EmptyUrl);
        }

        let method = match self.method.as_deref() {
            Some(m) if !m.trim().is_empty() => m.parse()?,
            _ => HttpMethod::default(),
        };

        let body = if self.body.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&self.body).map_err(FormError::InvalidBody)?)
        };

        let concurrency = self.concurrency.unwrap_or(default_concurrency);
        if concurrency == 0 {
            return Err(FormError::InvalidConcurrency);
        }

        Ok(BatchPlan {
            descriptor: RequestDescriptor { url, method, body },
            count: self.count.unwrap_or(default_count),
            concurrency,
        })
    }
}
