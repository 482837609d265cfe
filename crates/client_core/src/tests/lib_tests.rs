use super::*;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use shared::domain::KonnektorId;
use tokio::{net::TcpListener, sync::Mutex};
use url::Url;

#[derive(Clone, Default)]
struct MockState {
    csrf_headers: Arc<Mutex<Vec<Option<String>>>>,
    multipart_fields: Arc<Mutex<Vec<(String, Option<String>, Vec<u8>)>>>,
}

async fn config_overview() -> impl IntoResponse {
    "<div id=\"konfigUebersicht\">ok</div>"
}

async fn save_konnektor(
    State(state): State<MockState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    state.csrf_headers.lock().await.push(
        headers
            .get("x-csrf-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state
            .multipart_fields
            .lock()
            .await
            .push((name, filename, bytes));
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": 500, "message": "Zertifikat ungueltig"})),
    )
}

#[derive(serde::Deserialize)]
struct SearchForm {
    #[serde(rename = "searchValue")]
    search_value: String,
}

async fn vzd_search(
    Path((konn_id, with_certs)): Path<(String, bool)>,
    Form(form): Form<SearchForm>,
) -> impl IntoResponse {
    format!("<p>{konn_id}:{with_certs}:{}</p>", form.search_value)
}

async fn execute(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, format!("<pre>{}</pre>", body["opId"]))
}

async fn keystore_delete() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>Whitelabel Error Page</html>")
}

async fn spawn_console_server() -> (Url, MockState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = MockState::default();
    let app = Router::new()
        .route("/openkim/konfiguration/uebersicht", get(config_overview))
        .route("/openkim/konnektor/speichern", post(save_konnektor))
        .route("/openkim/vzd/suchen/:konn_id/:with_certs", post(vzd_search))
        .route("/openkim/konnwebservice/ausfuehren", post(execute))
        .route("/openkim/openkimkeystore/loeschen", get(keystore_delete))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let base = Url::parse(&format!("http://{addr}/openkim/")).expect("base url");
    (base, state)
}

fn csrf() -> CsrfToken {
    CsrfToken::new("X-CSRF-TOKEN", "token-123")
}

#[tokio::test]
async fn fetches_fragment_markup() {
    let (base, _) = spawn_console_server().await;
    let transport = HttpTransport::new().expect("client");
    let request =
        RequestDescriptor::build(&base, Endpoint::ConfigOverview, Payload::Empty, None)
            .expect("request");
    let body = transport.send(request).await.expect("fragment");
    assert_eq!(body, "<div id=\"konfigUebersicht\">ok</div>");
}

#[tokio::test]
async fn multipart_upload_sends_files_fields_and_csrf_header() {
    let (base, state) = spawn_console_server().await;
    let transport = HttpTransport::new().expect("client");

    let mut form = MultipartForm::new();
    form.append_file(FilePart {
        field: "clientCertFile".to_string(),
        filename: "client.p12".to_string(),
        bytes: vec![1, 2, 3],
        mime_type: Some("application/x-pkcs12".to_string()),
    });
    form.append_text("ip", "10.0.0.1");
    form.set_text("activated", "true");

    let request = RequestDescriptor::build(
        &base,
        Endpoint::KonnektorSave,
        Payload::Multipart(form),
        Some(&csrf()),
    )
    .expect("request");
    let err = transport.send(request).await.expect_err("server error");

    assert_eq!(err.display_message(), "Zertifikat ungueltig");
    assert_eq!(err.status(), Some(500));
    assert_eq!(
        *state.csrf_headers.lock().await,
        vec![Some("token-123".to_string())]
    );
    let fields = state.multipart_fields.lock().await.clone();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].0, "clientCertFile");
    assert_eq!(fields[0].1.as_deref(), Some("client.p12"));
    assert_eq!(fields[0].2, vec![1, 2, 3]);
    assert_eq!(fields[1].0, "ip");
    assert_eq!(fields[2], ("activated".to_string(), None, b"true".to_vec()));
}

#[tokio::test]
async fn legacy_search_posts_url_encoded_value() {
    let (base, _) = spawn_console_server().await;
    let transport = HttpTransport::new().expect("client");
    let request = RequestDescriptor::build(
        &base,
        Endpoint::VzdSearch {
            konnektor: KonnektorId::new("k-1"),
            with_certificates: true,
        },
        Payload::Form(vec![("searchValue".to_string(), "Praxis & Co".to_string())]),
        Some(&csrf()),
    )
    .expect("request");
    let body = transport.send(request).await.expect("fragment");
    assert_eq!(body, "<p>k-1:true:Praxis & Co</p>");
}

#[tokio::test]
async fn raw_text_endpoint_error_keeps_body() {
    let (base, _) = spawn_console_server().await;
    let transport = HttpTransport::new().expect("client");
    let request = RequestDescriptor::build(
        &base,
        Endpoint::WebserviceExecute,
        Payload::Json(json!({"opId": "ReadCard"})),
        Some(&csrf()),
    )
    .expect("request");
    let err = transport.send(request).await.expect_err("bad gateway");
    assert_eq!(err.display_message(), "<pre>\"ReadCard\"</pre>");
}

#[tokio::test]
async fn json_endpoint_with_html_error_is_malformed() {
    let (base, _) = spawn_console_server().await;
    let transport = HttpTransport::new().expect("client");
    let request =
        RequestDescriptor::build(&base, Endpoint::KeystoreDelete, Payload::Empty, None)
            .expect("request");
    let err = transport.send(request).await.expect_err("error");
    assert!(matches!(err, TransportError::MalformedErrorBody { status: 500, .. }));
    assert_eq!(err.display_message(), "<html>Whitelabel Error Page</html>");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let base = Url::parse(&format!("http://{addr}/")).expect("url");
    let transport = HttpTransport::new().expect("client");
    let request =
        RequestDescriptor::build(&base, Endpoint::DashboardOverview, Payload::Empty, None)
            .expect("request");
    let err = transport.send(request).await.expect_err("refused");
    assert!(matches!(err, TransportError::Network { .. }));
    assert!(!err.display_message().is_empty());
}
