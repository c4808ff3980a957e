use askama::Template;
use axum::response::IntoResponse;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub current_page: &'static str,
}

pub async fn index() -> impl IntoResponse {
    IndexTemplate { current_page: "home" }
}

pub async fn health_check() -> &'static str {
    "OK"
}
