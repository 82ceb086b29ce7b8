use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::state::AppState;

const PAGE: &str = include_str!("../static/index.html");

pub fn render_page(config: &AppConfig) -> String {
    PAGE.replace("{{BANNER}}", config.environment.banner())
        .replace("{{COUNT}}", &config.default_count.to_string())
        .replace("{{CONCURRENCY}}", &config.default_concurrency.to_string())
}

pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&state.config))
}
