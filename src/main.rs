use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod config;
mod error;
mod executor;
mod models;
mod page;
mod resolver;
mod state;
mod ws;

use crate::config::AppConfig;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "request_perf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let bind_addr = config.bind_addr.clone();

    info!(
        environment = %config.environment,
        jira = %config.jira_base_url,
        "Server started on http://{}",
        bind_addr
    );

    let state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::get().to(page::index))
            .route("/ws", web::get().to(ws::ws_handler))
            .route("/resolver", web::post().to(resolver::resolver_handler))
    })
    .bind(bind_addr)?
    .run()
    .await
}
