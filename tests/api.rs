use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use serde_json::{Value, json};

use hrms::auth::jwt::generate_access_token;
use hrms::config::{Config, StoreBackend};
use hrms::eligibility::LeavePolicy;
use hrms::state::AppState;
use hrms::store::MemoryStore;

const SECRET: &str = "test-secret";

fn config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        seed_demo_data: false,
        jwt_secret: SECRET.into(),
        access_token_ttl: 3600,
        rate_login_per_min: 1000,
        rate_register_per_min: 1000,
        rate_protected_per_min: 10_000,
        api_prefix: "/api".into(),
        leave_policy: LeavePolicy::default(),
    }
}

fn state() -> AppState {
    AppState::new(config(), Arc::new(MemoryStore::new())).unwrap()
}

// The rate limiter keys on the peer address.
fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn bearer() -> (&'static str, String) {
    let token = generate_access_token(1, "admin@deptech.com".into(), SECRET, 3600).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(bearer())
}

fn post(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(bearer())
        .set_json(body)
}

fn patch(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::patch()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(bearer())
        .set_json(body)
}

fn delete(uri: &str) -> test::TestRequest {
    test::TestRequest::delete()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(bearer())
}

fn john() -> Value {
    json!({
        "first_name": "John",
        "last_name": "Doe",
        "email": "john@deptech.com",
        "phone": "08123456789",
        "address": "Jakarta",
        "gender": "MALE"
    })
}

fn leave(employee_id: u64, start: &str, end: &str) -> Value {
    json!({
        "reason": "Vacation",
        "start_date": start,
        "end_date": end,
        "employee_id": employee_id
    })
}

#[actix_web::test]
async fn register_then_login_issues_a_working_token() {
    let state = state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let admin = json!({
        "first_name": "Super",
        "last_name": "Admin",
        "email": "admin@deptech.com",
        "birth_date": "1990-01-01",
        "gender": "MALE",
        "password": "admin123"
    });

    let req = test::TestRequest::post()
        .uri("/api/admin/register")
        .peer_addr(peer())
        .set_json(&admin)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Admin registered successfully");
    assert_eq!(body["data"]["email"], "admin@deptech.com");
    assert!(body["data"].get("password").is_none());

    let req = test::TestRequest::post()
        .uri("/api/admin/register")
        .peer_addr(peer())
        .set_json(&admin)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Email already registered");

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .peer_addr(peer())
        .set_json(json!({ "email": "admin@deptech.com", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");

    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .peer_addr(peer())
        .set_json(json!({ "email": "admin@deptech.com", "password": "admin123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["user"]["first_name"], "Super");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/admin")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn registration_rejects_short_passwords() {
    let state = state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/register")
        .peer_addr(peer())
        .set_json(json!({
            "first_name": "HR",
            "last_name": "Manager",
            "email": "hr@deptech.com",
            "birth_date": "1988-05-15T00:00:00Z",
            "gender": "FEMALE",
            "password": "12345"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(
        body["details"],
        json!(["password must be longer than or equal to 6 characters"])
    );
}

#[actix_web::test]
async fn protected_routes_require_a_bearer_token() {
    let state = state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri("/api/employee")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status_code"], 401);
    assert_eq!(body["message"], "Missing Authorization header");
    assert_eq!(body["path"], "/api/employee");

    let forged = generate_access_token(1, "admin@deptech.com".into(), "other-secret", 3600).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/employee")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn employee_lifecycle() {
    let state = state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let resp = test::call_service(&app, post("/api/employee", john()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Employee created successfully");
    let id = body["data"]["id"].as_u64().unwrap();

    let resp = test::call_service(&app, post("/api/employee", john()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Employee with this email already exists");

    let resp = test::call_service(
        &app,
        patch(&format!("/api/employee/{}", id), json!({ "phone": "08999999999" })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["phone"], "08999999999");
    assert_eq!(body["data"]["email"], "john@deptech.com");

    let resp = test::call_service(
        &app,
        post("/api/leave", leave(id, "2025-09-10", "2025-09-10")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let leave_id = body["data"]["id"].as_u64().unwrap();
    assert_eq!(body["data"]["employee"]["id"], id);

    let resp = test::call_service(&app, get("/api/employee/with-leaves").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["leaves"].as_array().unwrap().len(), 1);

    let resp = test::call_service(&app, get(&format!("/api/employee/{}/leaves", id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["leaves"][0]["id"], leave_id);

    let resp = test::call_service(&app, delete(&format!("/api/employee/{}", id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(&app, delete(&format!("/api/leave/{}", leave_id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, delete(&format!("/api/employee/{}", id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, get(&format!("/api/employee/{}", id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], format!("Employee with ID {} not found", id));
    assert_eq!(body["path"], format!("/api/employee/{}", id));
}

#[actix_web::test]
async fn leave_rules_are_enforced_over_http() {
    let state = state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let resp = test::call_service(&app, post("/api/employee", john()).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let id = body["data"]["id"].as_u64().unwrap();

    let resp = test::call_service(
        &app,
        post("/api/leave", leave(id, "2025-09-10", "2025-09-10")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Leave request created successfully");
    assert_eq!(body["data"]["status"], "PENDING");
    let september = body["data"]["id"].as_u64().unwrap();

    let cases = [
        (leave(id, "2025-09-20", "2025-09-20"), "MONTHLY_QUOTA_EXCEEDED"),
        (leave(id, "2025-10-30", "2025-11-02"), "MULTI_MONTH_SPAN"),
        (leave(id, "2025-10-10", "2025-10-09"), "INVALID_RANGE"),
    ];
    for (body, reason) in cases {
        let resp = test::call_service(&app, post("/api/leave", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["details"]["reason"], reason);
    }

    let resp = test::call_service(
        &app,
        post("/api/leave", leave(999, "2025-10-10", "2025-10-10")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // status change alone never re-runs the rules
    let resp = test::call_service(
        &app,
        patch(&format!("/api/leave/{}", september), json!({ "status": "APPROVED" })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "APPROVED");

    let resp = test::call_service(
        &app,
        patch(
            &format!("/api/leave/{}", september),
            json!({ "start_date": "2025-10-15", "end_date": "2025-10-15" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        post("/api/leave", leave(id, "2025-09-20", "2025-09-20")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, get(&format!("/api/leave?employee_id={}", id)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Retrieved leave records");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let resp = test::call_service(&app, get("/api/leave/999").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Leave with ID 999 not found");
    assert_eq!(body["path"], "/api/leave/999");
}

#[actix_web::test]
async fn malformed_bodies_get_the_error_envelope() {
    let state = state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let mut bad_email = john();
    bad_email["email"] = json!("john-at-deptech");
    let resp = test::call_service(&app, post("/api/employee", bad_email).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"], json!(["email must be an email"]));
    assert_eq!(body["path"], "/api/employee");

    let resp = test::call_service(
        &app,
        post("/api/leave", json!({ "reason": "x", "start_date": "10/09/2025", "end_date": "2025-09-10", "employee_id": 1 }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status_code"], 400);
    assert_eq!(body["error"], "Bad Request");

    let resp = test::call_service(&app, get("/api/leave?employee_id=abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["path"], "/api/leave?employee_id=abc");
}
