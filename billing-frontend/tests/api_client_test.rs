use billing_core::statement::parse_filter;
use billing_core::{Decimal, InvoiceStatus};
use billing_frontend::services::api_client::{ApiError, BillingApiClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BillingApiClient {
    BillingApiClient::with_timeout(&server.uri(), Duration::from_secs(5))
        .expect("mock server URL is valid")
}

#[tokio::test]
async fn missing_invoice_surfaces_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invoices/abc"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Invoice not found"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).get_invoice("abc").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        ApiError::Backend { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Invoice not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn invoice_list_tolerates_loose_backend_types() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "_id": "65f0c0ffee",
                "invoice_no": "INV-001",
                "date": "2025-01-05",
                "buyer_name": "Sai Packaging",
                "address": "Bhiwandi",
                "gstin": "",
                "items": [
                    {"product_name": "Black Ink", "packing_qty": "20", "no_of_units": 3,
                     "rate_per_kg": 150, "hsn_code": "3215"}
                ],
                "subtotal": 9000,
                "cgst": 810,
                "sgst": 810,
                "total_amount": "10620",
                "status": "paid"
            },
            {"invoice_no": "INV-002", "items": []}
        ])))
        .mount(&server)
        .await;

    let invoices = client(&server).list_invoices().await.unwrap();

    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0].id.as_deref(), Some("65f0c0ffee"));
    assert_eq!(invoices[0].items[0].quantity_kg(), Decimal::from(60));
    assert_eq!(invoices[0].total_amount, Decimal::from(10620));
    assert_eq!(invoices[0].status, InvoiceStatus::Paid);
    assert_eq!(invoices[1].status, InvoiceStatus::Unpaid);
    assert_eq!(invoices[1].total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn stock_adjustment_sends_signed_delta() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/products/p1/stock"))
        .and(body_json(json!({"quantity": -5.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Stock updated successfully",
            "stock_quantity": 95
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adjusted = client(&server)
        .adjust_stock("p1", Decimal::from(-5))
        .await
        .unwrap();

    assert_eq!(adjusted.stock_quantity, Decimal::from(95));
}

#[tokio::test]
async fn statement_request_carries_date_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/statements/b1"))
        .and(query_param("start_date", "2025-04-01"))
        .and(query_param("end_date", "2025-04-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "buyer": "Sai Packaging",
            "buyer_gstin": "27ABCDE1234F1Z5",
            "invoice_count": 1,
            "total_qty": 60,
            "total_amount": 10620,
            "invoices": [
                {"_id": "i1", "invoice_no": "INV-001", "date": "2025-04-03",
                 "items": [{"packing_qty": 20, "no_of_units": 3, "total_qty": 60}],
                 "total_amount": 10620}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = parse_filter(Some("2025-04-01"), Some("2025-04-30")).unwrap();
    let statement = client(&server).get_statement("b1", &filter).await.unwrap();

    assert_eq!(statement.buyer, "Sai Packaging");
    assert_eq!(statement.invoices.len(), 1);
}

#[tokio::test]
async fn status_toggle_puts_lowercase_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/invoices/i1/status"))
        .and(body_json(json!({"status": "paid"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Status updated"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server)
        .set_invoice_status("i1", InvoiceStatus::Paid)
        .await
        .unwrap();
    assert_eq!(ack.message, "Status updated");
}

#[tokio::test]
async fn create_returns_new_id_and_validation_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/buyers"))
        .and(body_json(json!({"name": "Sai Packaging", "address": "Bhiwandi", "gstin": ""})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Buyer added successfully",
            "id": "b42"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/invoices"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Missing fields: address"})),
        )
        .mount(&server)
        .await;

    let api = client(&server);
    let created = api
        .create_buyer(&billing_core::models::NewBuyer {
            name: "Sai Packaging".into(),
            address: "Bhiwandi".into(),
            gstin: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "b42");

    let err = api.create_invoice(&json!({})).await.unwrap_err();
    assert_eq!(err.user_message(), "Missing fields: address");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let api = BillingApiClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500))
        .unwrap();
    let err = api.list_buyers().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
