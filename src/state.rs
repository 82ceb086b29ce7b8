use crate::client::{build_client, transport_for, HttpsClient, TimedRequest};
use crate::config::AppConfig;

/// Shared by every worker of the HTTP server. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub client: HttpsClient,
    pub adapter: TimedRequest,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = build_client();
        let transport = transport_for(config.environment, client.clone(), &config.jira_base_url);
        Self {
            adapter: TimedRequest::new(transport),
            client,
            config,
        }
    }
}
