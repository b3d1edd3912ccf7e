//! End-to-end tests of the HTTP API.
//!
//! Each test runs the real router on an ephemeral port, backed by the
//! in-memory document store and stub generator/payment ports, and talks to it
//! through `ApiClient` or plain `reqwest`.

use std::sync::{Arc, Mutex};

use api_lib::{
    client::ApiClient,
    config::Config,
    web::{router, state::AppState, USER_ID_HEADER},
};
use async_trait::async_trait;
use flashcards_core::{
    domain::{Card, CheckoutSession, CheckoutStatus, Plan, UserId},
    generation::GenerationOutcome,
    memory::MemoryDocumentStore,
    pages::{AuthSnapshot, GeneratePage, HomePage, ResultPage, ResultState},
    ports::{FlashcardGenerator, PaymentService, PortError, PortResult},
    repository::CollectionRepository,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

//=========================================================================================
// Stub Ports
//=========================================================================================

struct StubGenerator {
    result: PortResult<Vec<Card>>,
    seen: Mutex<Vec<String>>,
}

impl StubGenerator {
    fn new(result: PortResult<Vec<Card>>) -> Arc<Self> {
        Arc::new(Self {
            result,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlashcardGenerator for StubGenerator {
    async fn generate(&self, text: &str) -> PortResult<Vec<Card>> {
        self.seen.lock().unwrap().push(text.to_string());
        self.result.clone()
    }
}

struct StubPayments;

#[async_trait]
impl PaymentService for StubPayments {
    async fn create_checkout_session(&self, plan: Plan) -> PortResult<CheckoutSession> {
        Ok(CheckoutSession {
            id: format!("cs_{:?}", plan).to_lowercase(),
            url: Some("https://checkout.stripe.test/pay/cs_1".to_string()),
        })
    }

    async fn get_checkout_session(&self, session_id: &str) -> PortResult<CheckoutStatus> {
        match session_id {
            "cs_paid" => Ok(CheckoutStatus {
                id: session_id.to_string(),
                payment_status: "paid".to_string(),
            }),
            "cs_unpaid" => Ok(CheckoutStatus {
                id: session_id.to_string(),
                payment_status: "unpaid".to_string(),
            }),
            _ => Err(PortError::NotFound(format!("No such checkout.session: {}", session_id))),
        }
    }
}

//=========================================================================================
// Harness
//=========================================================================================

struct TestServer {
    base_url: String,
    store: Arc<MemoryDocumentStore>,
}

async fn spawn(
    generator: Arc<dyn FlashcardGenerator>,
    payments: Option<Arc<dyn PaymentService>>,
) -> TestServer {
    let store = Arc::new(MemoryDocumentStore::new());
    let config = Arc::new(Config::from_lookup(|_| None).unwrap());
    let app_state = Arc::new(AppState {
        repository: CollectionRepository::new(store.clone()),
        generator,
        payments,
        config,
    });
    let app = router(app_state).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        store,
    }
}

fn user() -> UserId {
    UserId::parse("user_1").unwrap()
}

fn client(server: &TestServer) -> ApiClient {
    ApiClient::new(reqwest::Client::new(), server.base_url.clone()).with_user(user())
}

#[test]
fn wildcard_cors_origin_fails_router_construction() {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.cors_origin = "*".to_string();
    let app_state = Arc::new(AppState {
        repository: CollectionRepository::new(Arc::new(MemoryDocumentStore::new())),
        generator: StubGenerator::new(Ok(vec![])),
        payments: None,
        config: Arc::new(config),
    });
    assert!(router(app_state).is_err());
}

//=========================================================================================
// Generation
//=========================================================================================

#[tokio::test]
async fn preview_shows_generated_card_and_flips() {
    let generator = StubGenerator::new(Ok(vec![Card::new("Q1", "A1")]));
    let server = spawn(generator.clone(), None).await;

    let mut page = GeneratePage::new(
        AuthSnapshot::signed_in(user()),
        Arc::new(client(&server)),
        CollectionRepository::new(server.store.clone()),
    );
    page.text = "The mitochondria is the powerhouse of the cell.".into();
    page.submit().await;

    assert_eq!(page.faces().len(), 1);
    assert_eq!(page.faces()[0].text, "Q1");
    page.toggle_card(0);
    assert_eq!(page.faces()[0].text, "A1");
    assert_eq!(
        generator.seen(),
        vec!["The mitochondria is the powerhouse of the cell.".to_string()]
    );
}

#[tokio::test]
async fn generator_failure_leaves_preview_empty() {
    let generator = StubGenerator::new(Err(PortError::Unexpected("rate limited".into())));
    let server = spawn(generator, None).await;
    let api = client(&server);

    let outcome = api.generate_outcome("some text").await.unwrap();
    assert!(matches!(outcome, GenerationOutcome::Malformed(_)));

    let mut page = GeneratePage::new(
        AuthSnapshot::signed_in(user()),
        Arc::new(api),
        CollectionRepository::new(server.store.clone()),
    );
    page.text = "some text".into();
    page.submit().await;
    assert!(page.cards().is_empty());
    assert!(page.notification.is_visible());
}

#[tokio::test]
async fn error_body_is_an_object_not_an_array() {
    let generator = StubGenerator::new(Err(PortError::Unexpected("boom".into())));
    let server = spawn(generator, None).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "text": "cells" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("error").and_then(Value::as_str).is_some());
}

#[tokio::test]
async fn raw_text_body_is_accepted() {
    let generator = StubGenerator::new(Ok(vec![Card::new("Q", "A")]));
    let server = spawn(generator.clone(), None).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
        .body("Plain pasted text")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([{ "front": "Q", "back": "A" }]));
    assert_eq!(generator.seen(), vec!["Plain pasted text".to_string()]);
}

#[tokio::test]
async fn empty_text_is_a_bad_request() {
    let generator = StubGenerator::new(Ok(vec![]));
    let server = spawn(generator.clone(), None).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "text": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(generator.seen().is_empty());
}

#[tokio::test]
async fn requests_without_user_are_unauthorized() {
    let server = spawn(StubGenerator::new(Ok(vec![])), None).await;
    let http = reqwest::Client::new();

    let response = http
        .get(format!("{}/api/collections", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = http
        .post(format!("{}/api/generate", server.base_url))
        .header(USER_ID_HEADER, "   ")
        .json(&json!({ "text": "cells" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(server.store.commits().await, 0);
}

//=========================================================================================
// Collections
//=========================================================================================

#[tokio::test]
async fn new_user_gets_empty_list_and_one_index() {
    let server = spawn(StubGenerator::new(Ok(vec![])), None).await;
    let http = reqwest::Client::new();

    for _ in 0..2 {
        let response = http
            .get(format!("{}/api/collections", server.base_url))
            .header(USER_ID_HEADER, "user_1")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.json::<Value>().await.unwrap(), json!([]));
    }
    assert_eq!(server.store.index_creations().await, 1);
}

#[tokio::test]
async fn collection_lifecycle() {
    let server = spawn(StubGenerator::new(Ok(vec![])), None).await;
    let http = reqwest::Client::new();
    let url = |path: &str| format!("{}{}", server.base_url, path);

    // Save two cards.
    let response = http
        .post(url("/api/collections"))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({
            "name": "World History",
            "cards": [
                { "front": "Q1", "back": "A1" },
                { "front": "Q2", "back": "A2" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same name again is refused and changes nothing.
    let before = server.store.snapshot().await;
    let response = http
        .post(url("/api/collections"))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "name": "World History", "cards": [{ "front": "Q3", "back": "A3" }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(server.store.snapshot().await, before);

    // Listing and reading back.
    let list: Value = http
        .get(url("/api/collections"))
        .header(USER_ID_HEADER, "user_1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([{ "name": "World History" }]));

    let cards: Vec<Value> = http
        .get(url("/api/collections/World%20History"))
        .header(USER_ID_HEADER, "user_1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["front"], "Q1");
    assert_eq!(cards[1]["back"], "A2");

    // Delete, then delete again.
    for _ in 0..2 {
        let response = http
            .delete(url("/api/collections/World%20History"))
            .header(USER_ID_HEADER, "user_1")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let list: Value = http
        .get(url("/api/collections"))
        .header(USER_ID_HEADER, "user_1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));
    assert!(server.store.snapshot().await.cards.is_empty());
}

#[tokio::test]
async fn padded_name_in_path_deletes_the_saved_collection() {
    let server = spawn(StubGenerator::new(Ok(vec![])), None).await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{}/api/collections", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "name": " Biology ", "cards": [{ "front": "Q", "back": "A" }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = http
        .delete(format!("{}/api/collections/%20Biology%20", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let snapshot = server.store.snapshot().await;
    assert!(snapshot.cards.is_empty());
    assert!(snapshot
        .indexes
        .values()
        .all(|index| index.entries.is_empty()));
}

#[tokio::test]
async fn blank_collection_name_is_a_bad_request() {
    let server = spawn(StubGenerator::new(Ok(vec![])), None).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/collections", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "name": "  ", "cards": [{ "front": "Q", "back": "A" }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Please enter a name" }));
}

#[tokio::test]
async fn store_failure_is_reported_and_writes_nothing() {
    let server = spawn(StubGenerator::new(Ok(vec![])), None).await;
    server.store.fail_next_commit().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/collections", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "name": "Biology", "cards": [{ "front": "Q", "back": "A" }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server.store.snapshot().await.is_empty());
}

//=========================================================================================
// Checkout
//=========================================================================================

#[tokio::test]
async fn subscribing_returns_the_hosted_checkout_url() {
    let server = spawn(StubGenerator::new(Ok(vec![])), Some(Arc::new(StubPayments))).await;
    let mut home = HomePage::new(Arc::new(client(&server)));

    let url = home.subscribe(Plan::Pro).await;
    assert_eq!(url.as_deref(), Some("https://checkout.stripe.test/pay/cs_1"));
    assert!(!home.notification.is_visible());
}

#[tokio::test]
async fn unknown_plan_is_a_bad_request() {
    let server = spawn(StubGenerator::new(Ok(vec![])), Some(Arc::new(StubPayments))).await;
    let response = reqwest::Client::new()
        .post(format!("{}/api/checkout_session", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "plan": "gold" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn result_page_reports_payment_status() {
    let server = spawn(StubGenerator::new(Ok(vec![])), Some(Arc::new(StubPayments))).await;
    let api: Arc<dyn PaymentService> = Arc::new(client(&server));

    let mut paid = ResultPage::new(api.clone(), Some("cs_paid".into()));
    paid.load().await;
    assert_eq!(paid.state(), &ResultState::Paid { session_id: "cs_paid".into() });

    let mut unpaid = ResultPage::new(api.clone(), Some("cs_unpaid".into()));
    unpaid.load().await;
    assert_eq!(unpaid.state(), &ResultState::Unpaid);

    let mut unknown = ResultPage::new(api, Some("cs_missing".into()));
    unknown.load().await;
    assert_eq!(
        unknown.state(),
        &ResultState::Failed("No such checkout.session: cs_missing".into())
    );
}

#[tokio::test]
async fn checkout_without_payments_is_unavailable() {
    let server = spawn(StubGenerator::new(Ok(vec![])), None).await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{}/api/checkout_session", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .json(&json!({ "plan": "basic" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = http
        .get(format!("{}/api/checkout_session", server.base_url))
        .header(USER_ID_HEADER, "user_1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
