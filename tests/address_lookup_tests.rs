// Address lookup tests - HttpAddressLookup against a local stub service
//
// The stub mimics the remote CEP API: GET with a `cep` query parameter,
// HTTP basic auth, and a JSON body carrying the address line.

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::get;
use comanda_core::address::{AddressError, AddressLookup, HttpAddressLookup};
use comanda_core::config::AddressServiceConfig;
use comanda_core::host::OrderTools;
use comanda_core::store::MemoryOrderStore;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

const EXPECTED_AUTH: &str = "Basic Y2xpZW50ZTpzZWdyZWRv";

async fn lookup_cep(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(EXPECTED_AUTH);
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }

    match params.get("cep").map(String::as_str) {
        Some("01001-000") => Ok(Json(json!({
            "cep": "01001-000",
            "endereco": "Praça da Sé, Sé, São Paulo - SP"
        }))),
        Some("70040-010") => Ok(Json(json!({ "cep": "70040-010" }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn spawn_stub() -> String {
    let app = Router::new().route("/cep", get(lookup_cep));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}/cep")
}

fn service(url: String) -> AddressServiceConfig {
    AddressServiceConfig {
        url,
        query_param: "cep".to_string(),
        address_field: "endereco".to_string(),
        username: None,
        password: None,
    }
}

fn lookup(url: String, user: &str, password: &str) -> HttpAddressLookup {
    HttpAddressLookup::with_credentials(
        service(url),
        Some(user.to_string()),
        Some(password.to_string()),
    )
}

#[tokio::test]
async fn resolves_address_with_basic_auth() {
    let url = spawn_stub().await;
    let address = lookup(url, "cliente", "segredo")
        .lookup("01001-000")
        .await
        .expect("lookup succeeds");
    assert_eq!(address, "Praça da Sé, Sé, São Paulo - SP");
}

#[tokio::test]
async fn rejected_credentials_surface_the_status() {
    let url = spawn_stub().await;
    let err = lookup(url, "cliente", "errado")
        .lookup("01001-000")
        .await
        .expect_err("unauthorized");
    assert!(matches!(err, AddressError::Status(status) if status == StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn missing_field_is_an_error() {
    let url = spawn_stub().await;
    let err = lookup(url, "cliente", "segredo")
        .lookup("70040-010")
        .await
        .expect_err("no endereco field");
    assert!(matches!(err, AddressError::MissingField(field) if field == "endereco"));
}

#[tokio::test]
async fn delivery_address_formats_or_reports_failure() {
    let url = spawn_stub().await;
    let tools = OrderTools::new(
        Arc::new(MemoryOrderStore::new()),
        Arc::new(lookup(url, "cliente", "segredo")),
    );

    assert_eq!(
        tools.delivery_address("01001-000", "12", "apto 3").await,
        "Praça da Sé, Sé, São Paulo - SP, Número: 12, Complemento: apto 3"
    );
    assert_eq!(
        tools.delivery_address("01001-000", "", "").await,
        "Praça da Sé, Sé, São Paulo - SP, Número: , Complemento: "
    );
    assert_eq!(
        tools.delivery_address("99999-999", "1", "").await,
        "Não foi possível consultar o endereço para o CEP informado."
    );
}

#[tokio::test]
async fn unreachable_service_reports_failure_text() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);

    let tools = OrderTools::new(
        Arc::new(MemoryOrderStore::new()),
        Arc::new(lookup(format!("http://{addr}/cep"), "cliente", "segredo")),
    );
    assert_eq!(
        tools.delivery_address("01001-000", "12", "").await,
        "Não foi possível consultar o endereço para o CEP informado."
    );
}
