use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use service_core::observability::extract_request_id;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    app::{health_check, index},
    buyers::{create_buyer, delete_buyer, edit_buyer_page, list_buyers_page, update_buyer},
    documents::{invoice_pdf, print_invoice, print_statement, statement_pdf},
    invoice_editor::{
        edit_invoice_page, new_invoice_page, submit_invoice_edit, submit_new_invoice,
    },
    invoices::{delete_invoice, list_invoices_page, set_status},
    metrics::metrics,
    statement::statement_page,
    stock::{
        adjust_stock, create_product, delete_product, edit_product_page, list_products_page,
        update_product,
    },
};
use crate::middleware::metrics::metrics_middleware;
use crate::AppState;

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        // Buyers
        .route("/buyers", get(list_buyers_page).post(create_buyer))
        .route("/buyers/:id/edit", get(edit_buyer_page).post(update_buyer))
        .route("/buyers/:id/delete", post(delete_buyer))
        // Stock
        .route("/stock", get(list_products_page).post(create_product))
        .route("/stock/:id/edit", get(edit_product_page).post(update_product))
        .route("/stock/:id/adjust", post(adjust_stock))
        .route("/stock/:id/delete", post(delete_product))
        // Invoices
        .route("/invoices", get(list_invoices_page))
        .route(
            "/invoices/new",
            get(new_invoice_page).post(submit_new_invoice),
        )
        .route(
            "/invoices/:id/edit",
            get(edit_invoice_page).post(submit_invoice_edit),
        )
        .route("/invoices/:id/status", post(set_status))
        .route("/invoices/:id/delete", post(delete_invoice))
        .route("/invoices/:id/print", get(print_invoice))
        .route("/invoices/:id/pdf", get(invoice_pdf))
        // Statements
        .route("/statement", get(statement_page))
        .route("/statement/:buyer_id/print", get(print_statement))
        .route("/statement/:buyer_id/pdf", get(statement_pdf))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id =
                    extract_request_id(request.headers()).unwrap_or_else(|| "-".to_string());

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the span above sees the id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
