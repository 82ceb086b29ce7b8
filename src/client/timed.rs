use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::client::Transport;
use crate::error::TransportError;
use crate::models::request_model::RequestDescriptor;

/// Times one transport call. Returns the elapsed milliseconds, or the
/// transport's error untouched.
#[derive(Clone)]
pub struct TimedRequest {
    transport: Arc<dyn Transport>,
}

impl TimedRequest {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<f64, TransportError> {
        let request_start = Instant::now();
        self.transport.send(descriptor).await?;
        let elapsed = request_start.elapsed().as_secs_f64() * 1000.0;

        info!(
            url = %descriptor.url,
            duration_ms = elapsed,
            "Request to {} took {:.2} ms",
            descriptor.url,
            elapsed
        );

        Ok(elapsed)
    }
}
