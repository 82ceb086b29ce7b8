use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::BatchError;
use crate::executor;
use crate::models::metrics::BatchReport;
use crate::models::request_model::{BatchForm, BatchPlan};
use crate::state::AppState;

/// Messages sent from the session to the page.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Banner { text: String },
    Started,
    Report(BatchReport),
    Error { message: String },
}

pub struct WsSession {
    state: web::Data<AppState>,
    executing: bool,
}

impl WsSession {
    pub fn new(state: web::Data<AppState>) -> Self {
        Self {
            state,
            executing: false,
        }
    }

    fn send(ctx: &mut ws::WebsocketContext<Self>, message: &ServerMessage) {
        match serde_json::to_string(message) {
            Ok(json) => ctx.text(json),
            Err(e) => warn!(error = %e, "failed to encode session message"),
        }
    }

    fn banner(&self) -> ServerMessage {
        ServerMessage::Banner {
            text: self.state.config.environment.banner().to_string(),
        }
    }

    /// Validates a submission and marks the session busy. Refused while a
    /// batch is still running.
    fn accept_submission(&mut self, text: &str) -> Result<BatchPlan, ServerMessage> {
        if self.executing {
            return Err(ServerMessage::Error {
                message: "A batch is already running".to_string(),
            });
        }

        let form: BatchForm = serde_json::from_str(text).map_err(|e| ServerMessage::Error {
            message: format!("Invalid form: {}", e),
        })?;

        let config = &self.state.config;
        let plan = form
            .into_plan(config.default_count, config.default_concurrency)
            .map_err(|e| ServerMessage::Error {
                message: e.to_string(),
            })?;

        self.executing = true;
        Ok(plan)
    }

    /// Clears the busy flag whatever the outcome.
    fn complete(&mut self, result: Result<BatchReport, BatchError>) -> ServerMessage {
        self.executing = false;
        match result {
            Ok(report) => ServerMessage::Report(report),
            Err(e) => ServerMessage::Error {
                message: e.to_string(),
            },
        }
    }

    fn start_batch(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let plan = match self.accept_submission(text) {
            Ok(plan) => plan,
            Err(message) => {
                Self::send(ctx, &message);
                return;
            }
        };

        Self::send(ctx, &ServerMessage::Started);

        let adapter = self.state.adapter.clone();
        let batch = async move { executor::execute_plan(adapter, plan).await };

        ctx.spawn(batch.into_actor(self).map(|result, act, ctx| {
            let message = act.complete(result);
            Self::send(ctx, &message);
        }));
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(environment = %self.state.config.environment, "WebSocket connection started");
        let banner = self.banner();
        Self::send(ctx, &banner);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => self.start_batch(&text, ctx),
            Ok(ws::Message::Ping(payload)) => ctx.pong(&payload),
            Ok(ws::Message::Close(reason)) => {
                debug!(?reason, "WebSocket connection closed");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "WebSocket protocol error");
                ctx.stop();
            }
        }
    }
}

pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(WsSession::new(state), &req, stream)
}
