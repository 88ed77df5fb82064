//! Integration tests for the storefront HTTP API.
//!
//! The real axum router is wired to the in-memory store, the mock payment
//! provider and a recording notifier, then driven with `oneshot` requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use course_academy::adapters::auth::{Argon2CredentialHasher, JwtSessionValidator};
use course_academy::adapters::email::RecordingNotifier;
use course_academy::adapters::http::{app_router, AuthState, StorefrontAppState};
use course_academy::adapters::memory::InMemoryStore;
use course_academy::adapters::stripe::{MockPaymentProvider, MOCK_WEBHOOK_SECRET};
use course_academy::domain::account::{User, UserRole};
use course_academy::domain::catalog::{Course, CourseModule, CourseStatus, Lesson};
use course_academy::domain::checkout::sign_payload;
use course_academy::domain::foundation::{AuthenticatedUser, CourseId, Money, Timestamp, UserId};
use course_academy::ports::NotificationKind;

const JWT_SECRET: &str = "integration-test-secret-of-32-bytes!";
const PUBLIC_URL: &str = "https://beautyacademy.sk";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    store: InMemoryStore,
    payments: Arc<MockPaymentProvider>,
    notifier: RecordingNotifier,
    tokens: JwtSessionValidator,
    course: Course,
}

fn lesson(title: &str, is_free: bool) -> Lesson {
    Lesson {
        title: title.to_string(),
        description: None,
        video_id: Some(format!("vid-{}", title.to_lowercase())),
        duration: Some("08:15".to_string()),
        is_free,
    }
}

fn published_course() -> Course {
    Course {
        id: CourseId::new(),
        slug: "zaklady-liceni".to_string(),
        title: "Základy líčenia".to_string(),
        price: Money::eur(4999).unwrap(),
        original_price: None,
        stripe_price_id: Some("price_liceni".to_string()),
        status: CourseStatus::Published,
        modules: vec![CourseModule {
            title: "Úvod".to_string(),
            description: None,
            lessons: vec![lesson("Vitajte", true), lesson("Pomôcky", false)],
        }],
    }
}

fn customer(email: &str) -> User {
    User {
        id: UserId::new(),
        email: email.to_string(),
        first_name: "Eva".to_string(),
        last_name: "Horváthová".to_string(),
        phone: None,
        role: UserRole::Customer,
        stripe_customer_id: None,
        purchased_courses: Vec::new(),
        course_progress: Vec::new(),
        marketing_consent: false,
        password_hash: None,
        created_at: Timestamp::now(),
        updated_at: Timestamp::now(),
    }
}

async fn test_app() -> TestApp {
    let store = InMemoryStore::new();
    let course = published_course();
    store.put_course(course.clone()).await;

    let payments = Arc::new(MockPaymentProvider::new());
    let notifier = RecordingNotifier::new();

    let state = StorefrontAppState {
        users: Arc::new(store.clone()),
        courses: Arc::new(store.clone()),
        orders: Arc::new(store.clone()),
        payment_provider: payments.clone(),
        hasher: Arc::new(Argon2CredentialHasher::new()),
        notifier: Arc::new(notifier.clone()),
        public_url: PUBLIC_URL.to_string(),
        checkout_locale: "sk".to_string(),
    };

    let auth = AuthState::new(
        Arc::new(JwtSessionValidator::new(SecretString::new(JWT_SECRET.to_string()))),
        "payload-token",
    );

    TestApp {
        router: app_router(state, auth),
        store,
        payments,
        notifier,
        tokens: JwtSessionValidator::new(SecretString::new(JWT_SECRET.to_string())),
        course,
    }
}

impl TestApp {
    async fn sign_in(&self, user: User) -> String {
        let viewer = AuthenticatedUser::new(user.id, user.email.clone(), user.role);
        self.store.put_user(user).await;
        self.tokens.issue(&viewer, 3600).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn webhook_payload(course_id: CourseId, metadata_course: bool) -> Vec<u8> {
    let metadata = if metadata_course {
        json!({ "courseId": course_id.to_string(), "courseSlug": "zaklady-liceni" })
    } else {
        json!({})
    };
    serde_json::to_vec(&json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": {
            "id": "cs_test_42",
            "metadata": metadata,
            "customer_email": "Jana@Example.com",
            "customer_details": { "email": "Jana@Example.com", "name": "Jana Nováková" },
            "amount_total": 4999,
            "currency": "eur",
            "payment_intent": "pi_42",
            "customer": "cus_42"
        }}
    }))
    .unwrap()
}

fn webhook_request(payload: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    builder.body(Body::from(payload)).unwrap()
}

fn signed_webhook(payload: Vec<u8>) -> Request<Body> {
    let signature =
        sign_payload(MOCK_WEBHOOK_SECRET, chrono::Utc::now().timestamp(), &payload).unwrap();
    webhook_request(payload, Some(signature))
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Webhook
// =============================================================================

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let app = test_app().await;

    let (status, body) = app
        .send(webhook_request(webhook_payload(app.course.id, true), None))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Chýba Stripe signature" }));
}

#[tokio::test]
async fn webhook_with_forged_signature_writes_nothing() {
    let app = test_app().await;
    let payload = webhook_payload(app.course.id, true);
    let forged = sign_payload("whsec_wrong", chrono::Utc::now().timestamp(), &payload).unwrap();

    let (status, body) = app.send(webhook_request(payload, Some(forged))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Neplatná signature" }));
    assert_eq!(app.store.user_count().await, 0);
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn guest_purchase_creates_account_order_and_emails() {
    let app = test_app().await;

    let (status, body) = app.send(signed_webhook(webhook_payload(app.course.id, true))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true }));

    let users = app.store.users().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "jana@example.com");
    assert!(users[0].owns_course(&app.course.id));
    assert_eq!(users[0].stripe_customer_id.as_deref(), Some("cus_42"));

    let orders = app.store.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].customer, users[0].id);
    assert_eq!(orders[0].stripe_checkout_session_id, "cs_test_42");

    assert_eq!(
        app.notifier.sent_kinds(),
        vec![NotificationKind::Welcome, NotificationKind::PurchaseConfirmation]
    );
}

#[tokio::test]
async fn redelivered_webhook_does_not_duplicate() {
    let app = test_app().await;

    app.send(signed_webhook(webhook_payload(app.course.id, true))).await;
    let (status, _) = app.send(signed_webhook(webhook_payload(app.course.id, true))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.user_count().await, 1);
    assert_eq!(app.store.order_count().await, 1);
    assert_eq!(app.store.users().await[0].purchased_courses.len(), 1);
}

#[tokio::test]
async fn webhook_without_course_metadata_is_acknowledged() {
    let app = test_app().await;

    let (status, body) = app.send(signed_webhook(webhook_payload(app.course.id, false))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "received": true }));
    assert_eq!(app.store.user_count().await, 0);
}

#[tokio::test]
async fn webhook_store_outage_is_500_so_stripe_retries() {
    let app = test_app().await;
    app.store.set_unavailable(true);

    let (status, body) = app.send(signed_webhook(webhook_payload(app.course.id, true))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Webhook handler failed");
    assert!(body["details"].is_string());
    assert!(app.notifier.sent().is_empty());
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn anonymous_checkout_is_401() {
    let app = test_app().await;

    let (status, body) = app
        .send(post_json("/api/stripe/checkout", None, json!({ "courseSlug": "zaklady-liceni" })))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Pre nákup sa musíte prihlásiť" }));
}

#[tokio::test]
async fn signed_in_checkout_returns_hosted_page() {
    let app = test_app().await;
    let user = customer("eva@example.com");
    let user_id = user.id;
    let token = app.sign_in(user).await;

    let (status, body) = app
        .send(post_json(
            "/api/stripe/checkout",
            Some(&token),
            json!({ "courseSlug": "zaklady-liceni" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().unwrap().starts_with("https://checkout.stripe.com"));

    let request = app.payments.last_checkout_request().unwrap();
    assert_eq!(request.price_id, "price_liceni");
    assert_eq!(request.user_id, user_id);
    assert_eq!(request.customer_email, "eva@example.com");
    assert!(request
        .success_url
        .starts_with("https://beautyacademy.sk/kurzy/zaklady-liceni?success=true"));
}

#[tokio::test]
async fn checkout_rejects_owned_unknown_and_missing_course() {
    let app = test_app().await;
    let mut owner = customer("owner@example.com");
    owner.purchased_courses.push(app.course.id);
    let token = app.sign_in(owner).await;

    let (status, body) = app
        .send(post_json(
            "/api/stripe/checkout",
            Some(&token),
            json!({ "courseSlug": "zaklady-liceni" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Tento kurz už vlastníte");

    let (status, body) = app
        .send(post_json("/api/stripe/checkout", Some(&token), json!({ "courseSlug": "neexistuje" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Kurz neexistuje");

    let (status, body) = app
        .send(post_json("/api/stripe/checkout", Some(&token), json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Chýba ID kurzu");

    assert_eq!(app.payments.call_count("create_checkout_session"), 0);
}

// =============================================================================
// Billing portal
// =============================================================================

#[tokio::test]
async fn portal_requires_sign_in_and_payment_history() {
    let app = test_app().await;

    let (status, body) = app.send(post_json("/api/stripe/portal", None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Pre prístup sa musíte prihlásiť");

    let token = app.sign_in(customer("eva@example.com")).await;
    let (status, body) = app
        .send(post_json("/api/stripe/portal", Some(&token), json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nemáte žiadne predchádzajúce platby");
}

#[tokio::test]
async fn portal_returns_billing_url_for_paying_customer() {
    let app = test_app().await;
    let mut user = customer("eva@example.com");
    user.stripe_customer_id = Some("cus_eva".to_string());
    let token = app.sign_in(user).await;

    let (status, body) = app
        .send(post_json("/api/stripe/portal", Some(&token), json!({})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://billing.stripe.com/p/session/test_mock");
    let call = app.payments.calls().pop().unwrap();
    assert_eq!(call.args, vec!["cus_eva", "https://beautyacademy.sk/dashboard"]);
}

// =============================================================================
// Lesson access
// =============================================================================

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("payload-token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn free_lesson_is_open_to_anonymous_viewers() {
    let app = test_app().await;

    let (status, body) = app.send(get("/api/courses/zaklady-liceni/lessons/0/0", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access"], "free_lesson");
    assert_eq!(body["lesson"]["title"], "Vitajte");
}

#[tokio::test]
async fn gated_lesson_redirects_to_purchase_page() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(get("/api/courses/zaklady-liceni/lessons/0/1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/kurzy/zaklady-liceni?access_denied=true"
    );
}

#[tokio::test]
async fn owner_reads_gated_lesson_with_cookie_session() {
    let app = test_app().await;
    let mut owner = customer("owner@example.com");
    owner.purchased_courses.push(app.course.id);
    let token = app.sign_in(owner).await;

    let (status, body) = app
        .send(get("/api/courses/zaklady-liceni/lessons/0/1", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access"], "owner");
    assert_eq!(body["lesson"]["videoId"], "vid-pomôcky");
}

#[tokio::test]
async fn missing_lesson_is_404() {
    let app = test_app().await;

    let (status, body) = app.send(get("/api/courses/zaklady-liceni/lessons/3/0", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Lekcia neexistuje");
}
