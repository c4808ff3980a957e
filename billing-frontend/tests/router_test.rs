use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use billing_frontend::config::SellerSettings;
use billing_frontend::services::api_client::BillingApiClient;
use billing_frontend::startup::build_router;
use billing_frontend::AppState;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(backend: &MockServer) -> Router {
    let api = BillingApiClient::with_timeout(&backend.uri(), Duration::from_secs(5))
        .expect("mock server URL is valid");
    let seller = SellerSettings {
        name: "SHIVANSH INKS".to_string(),
        gstin: "27AREPK4801E1Z5".to_string(),
        ..Default::default()
    };
    build_router(AppState::new(Arc::new(api), Arc::new(seller)), "static")
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

async fn post_form(app: Router, uri: &str, form: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&body).into_owned())
}

async fn mount_lookups(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/buyers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "b1", "name": "Sai Packaging", "address": "Bhiwandi", "gstin": "27ABCDE1234F1Z5"},
            {"_id": "b2", "name": "Om Traders", "address": "Thane", "gstin": ""}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "p1", "name": "Black Ink", "stock_quantity": 120,
             "default_rate_per_kg": 150, "hsn_code": "3215"}
        ])))
        .mount(server)
        .await;
}

fn stored_invoice() -> serde_json::Value {
    json!({
        "_id": "i1",
        "invoice_no": "INV-001",
        "date": "2025-01-05",
        "buyer_name": "Sai Packaging",
        "address": "Bhiwandi",
        "gstin": "27abcde1234f1z5",
        "items": [
            {"product_name": "Black Ink", "packing_qty": 20, "no_of_units": 3,
             "rate_per_kg": 150, "hsn_code": "3215"}
        ],
        "subtotal": 9000, "cgst": 810, "sgst": 810, "total_amount": 10620,
        "status": "unpaid"
    })
}

#[tokio::test]
async fn health_check_works() {
    let backend = MockServer::start().await;
    let (status, headers, body) = get(app(&backend), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn metrics_are_exposed() {
    billing_frontend::services::metrics::init_metrics();
    let backend = MockServer::start().await;
    let router = app(&backend);

    get(router.clone(), "/health").await;
    let (status, _, body) = get(router, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("billing_http_requests_total"));
}

#[tokio::test]
async fn buyer_search_filters_the_list() {
    let backend = MockServer::start().await;
    mount_lookups(&backend).await;

    let (status, _, body) = get(app(&backend), "/buyers?q=sai").await;
    let html = String::from_utf8_lossy(&body);

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Sai Packaging"));
    assert!(!html.contains("Om Traders"));
    assert!(html.contains("Showing 1 of 2 buyers"));
}

#[tokio::test]
async fn backend_failure_renders_banner_not_500() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invoices"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "database down"})))
        .mount(&backend)
        .await;

    let (status, _, body) = get(app(&backend), "/invoices").await;
    let html = String::from_utf8_lossy(&body);

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("banner error"));
    assert!(html.contains("database down"));
}

#[tokio::test]
async fn invalid_buyer_form_is_rejected_without_backend_call() {
    let backend = MockServer::start().await;
    mount_lookups(&backend).await;
    Mock::given(method("POST"))
        .and(path("/buyers"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend)
        .await;

    let (status, _, html) = post_form(app(&backend), "/buyers", "name=&address=Thane").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Name is required"));
}

#[tokio::test]
async fn missing_invoice_renders_not_found_page() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invoices/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Invoice not found"})))
        .mount(&backend)
        .await;

    let (status, _, body) = get(app(&backend), "/invoices/nope/print").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(String::from_utf8_lossy(&body).contains("Invoice not found"));
}

#[tokio::test]
async fn unreachable_backend_renders_service_unavailable_page() {
    let api = BillingApiClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500))
        .expect("static URL is valid");
    let router = build_router(
        AppState::new(Arc::new(api), Arc::new(SellerSettings::default())),
        "static",
    );

    let (status, _, body) = get(router, "/invoices/i1/print").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(String::from_utf8_lossy(&body).contains("could not be reached"));
}

#[tokio::test]
async fn printed_invoice_with_oversized_figures_still_renders() {
    let backend = MockServer::start().await;
    let mut invoice = stored_invoice();
    invoice["items"] = json!([
        {"product_name": "Black Ink", "packing_qty": "100000000000000000000",
         "no_of_units": "100000000000000000000", "rate_per_kg": 150},
        {"product_name": "Red Ink", "packing_qty": "79228162514264337593543950335",
         "no_of_units": 1, "rate_per_kg": 1},
        {"product_name": "Blue Ink", "packing_qty": "79228162514264337593543950335",
         "no_of_units": 1, "rate_per_kg": 1}
    ]);
    Mock::given(method("GET"))
        .and(path("/invoices/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(invoice))
        .mount(&backend)
        .await;

    let (status, _, body) = get(app(&backend), "/invoices/i1/print").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("TAX INVOICE"));
}

#[tokio::test]
async fn printed_invoice_shows_totals_and_words() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invoices/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_invoice()))
        .mount(&backend)
        .await;

    let (status, _, body) = get(app(&backend), "/invoices/i1/print").await;
    let html = String::from_utf8_lossy(&body);

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("TAX INVOICE"));
    assert!(html.contains("10,620.00"));
    assert!(html.contains("Ten Thousand Six Hundred Twenty Rupees Only"));
    assert!(html.contains("27ABCDE1234F1Z5"));
    assert!(html.contains("20 x 3 = 60"));
}

#[tokio::test]
async fn invoice_pdf_is_downloaded() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invoices/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_invoice()))
        .mount(&backend)
        .await;

    let (status, headers, body) = get(app(&backend), "/invoices/i1/pdf").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/pdf");
    assert!(headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("invoice-INV-001.pdf"));
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn editor_adds_rows_and_recomputes() {
    let backend = MockServer::start().await;
    mount_lookups(&backend).await;

    let form = "action=add_item&invoice_no=INV-9&date=2025-01-05\
                &product_name=Ink&hsn_code=3215&packing_qty=20&no_of_units=3&rate_per_kg=150&product_id=";
    let (status, _, html) = post_form(app(&backend), "/invoices/new", form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("remove_item:1"));
    assert!(html.contains("10,620.00"));
}

#[tokio::test]
async fn editor_picks_product_into_row() {
    let backend = MockServer::start().await;
    mount_lookups(&backend).await;

    let form = "action=pick_product%3A0&product_name=&hsn_code=&packing_qty=10&no_of_units=1\
                &rate_per_kg=&product_id=p1";
    let (status, _, html) = post_form(app(&backend), "/invoices/new", form).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("value=\"Black Ink\""));
    assert!(html.contains("1,500.00"));
}

#[tokio::test]
async fn saving_incomplete_invoice_reports_missing_fields() {
    let backend = MockServer::start().await;
    mount_lookups(&backend).await;
    Mock::given(method("POST"))
        .and(path("/invoices"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend)
        .await;

    let (status, _, html) =
        post_form(app(&backend), "/invoices/new", "action=save&invoice_no=INV-9").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Missing fields: date, buyer_name, address"));
}

#[tokio::test]
async fn saving_complete_invoice_posts_computed_totals() {
    let backend = MockServer::start().await;
    mount_lookups(&backend).await;
    Mock::given(method("POST"))
        .and(path("/invoices"))
        .and(body_partial_json(json!({
            "invoice_no": "INV-9",
            "subtotal": 9000.0,
            "cgst": 810.0,
            "sgst": 810.0,
            "total_amount": 10620.0,
            "status": "unpaid"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Invoice created successfully",
            "id": "new1"
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let form = "action=save&invoice_no=INV-9&date=2025-01-05&buyer_name=Sai+Packaging\
                &address=Bhiwandi&gstin=27ABCDE1234F1Z5&status=unpaid\
                &product_name=Ink&hsn_code=3215&packing_qty=20&no_of_units=3&rate_per_kg=150&product_id=";
    let (status, headers, _) = post_form(app(&backend), "/invoices/new", form).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(
        headers.get(header::LOCATION).unwrap(),
        "/invoices?notice=invoice_created"
    );
}

#[tokio::test]
async fn inverted_statement_range_is_reported() {
    let backend = MockServer::start().await;
    mount_lookups(&backend).await;

    let (status, _, body) = get(
        app(&backend),
        "/statement?buyer_id=b1&start_date=2025-05-01&end_date=2025-04-01",
    )
    .await;
    let html = String::from_utf8_lossy(&body);

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("end_date must not be before start_date"));
}
