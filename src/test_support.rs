//! In-process stand-in for the OpenJudge gateway.
//!
//! Each test gets its own server on an ephemeral port, so cookies, tokens
//! and knobs never leak between tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{ApiClient, ResponseContext, ResponseHook},
    auth::{claims::decode_unverified, AuthService, SessionExpiryHook, SessionStore},
    config::{ApiConfig, Environment},
    navigation::History,
};

pub const STUDENT_EMAIL: &str = "ada@openjudge.dev";
pub const PASSWORD: &str = "correct-horse";

/// A signed token for a fresh random subject.
pub fn access_token() -> (String, Uuid) {
    let subject = Uuid::new_v4();
    (sign(subject, 0), subject)
}

fn sign(subject: Uuid, nonce: u64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    encode(
        &Header::default(),
        &json!({
            "id": Uuid::new_v4().to_string(),
            "sub": subject.to_string(),
            "iss": "http://gateway/auth",
            "iat": now,
            "exp": now + 3600,
            "nonce": nonce,
        }),
        &EncodingKey::from_secret(b"gateway-secret"),
    )
    .unwrap()
}

/// Switches that steer the fake gateway from inside a test.
#[derive(Debug, Default)]
pub struct Knobs {
    login_calls: AtomicUsize,
    issued: AtomicU64,
    logout_fails: AtomicBool,
    revoked: AtomicBool,
    pending_polls: AtomicU32,
    last_submitter: Mutex<Option<Uuid>>,
}

impl Knobs {
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn fail_logout(&self) {
        self.logout_fails.store(true, Ordering::SeqCst);
    }

    /// Every bearer token is rejected from now on.
    pub fn revoke_tokens(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    /// `GET /submission/sub-1` answers `pending` this many times.
    pub fn pending_for(&self, polls: u32) {
        self.pending_polls.store(polls, Ordering::SeqCst);
    }

    pub fn last_submitter(&self) -> Option<Uuid> {
        *self.last_submitter.lock().unwrap()
    }
}

#[derive(Clone)]
struct Gateway {
    knobs: Arc<Knobs>,
    student_id: Uuid,
}

impl Gateway {
    fn issue(&self) -> String {
        let nonce = self.knobs.issued.fetch_add(1, Ordering::SeqCst);
        sign(self.student_id, nonce)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.knobs.revoked.load(Ordering::SeqCst) {
            return false;
        }
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| decode_unverified(token).ok())
            .and_then(|claims| claims.user_id())
            == Some(self.student_id)
    }
}

pub struct FakeGateway {
    pub base_url: String,
    pub knobs: Arc<Knobs>,
    student_id: Uuid,
}

impl FakeGateway {
    pub fn student_id(&self) -> Uuid {
        self.student_id
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            environment: Environment::Local,
            timeout: Duration::from_secs(5),
        }
    }

    /// A bare client with no response hook.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_config()).unwrap()
    }

    /// Auth service wired the way the application wires it: the client
    /// reports to a [`SessionExpiryHook`] that drives a [`History`] at `/`.
    pub fn wire(&self) -> (AuthService, History) {
        let session = SessionStore::new();
        let history = History::new("/");
        let hook = SessionExpiryHook::new(session.clone(), Arc::new(history.clone()));
        let client = self.client().with_hook(Arc::new(hook));
        (AuthService::new(client, session), history)
    }
}

pub async fn spawn_gateway() -> FakeGateway {
    let state = Gateway {
        knobs: Arc::new(Knobs::default()),
        student_id: Uuid::new_v4(),
    };
    let knobs = state.knobs.clone();
    let student_id = state.student_id;

    let router = Router::new()
        .route("/echo", get(echo))
        .route("/slow", get(slow))
        .route("/notes", get(|| async { "Nothing to report" }))
        .route("/blank", get(|| async { "" }))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/user", get(profile).post(update_profile).delete(delete_profile))
        .route("/verify", post(verify))
        .route("/forgot", post(|| async { "Password reset email sent" }))
        .route("/reset", post(|| async { "Password updated" }))
        .route("/problems", get(problems))
        .route("/problems/:id", get(problem))
        .route("/submission", get(submissions).post(submit))
        .route("/submission/:id", get(submission))
        .route("/submission/ai/:id", get(feedback))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    FakeGateway {
        base_url: format!("http://{addr}"),
        knobs,
        student_id,
    }
}

/// Records what the client reports to its hook.
#[derive(Debug, Default)]
pub struct RecordingHook {
    seen: Mutex<Vec<(String, u16, bool)>>,
}

impl RecordingHook {
    pub fn seen(&self) -> Vec<(String, u16, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

impl ResponseHook for RecordingHook {
    fn on_response(&self, ctx: &ResponseContext<'_>) {
        self.seen
            .lock()
            .unwrap()
            .push((ctx.endpoint.to_string(), ctx.status.as_u16(), ctx.bearer.is_some()));
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "q": query.get("q"),
        "authorization": headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    }))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "late"
}

async fn login(State(gw): State<Gateway>, Json(body): Json<Value>) -> Response {
    gw.knobs.login_calls.fetch_add(1, Ordering::SeqCst);
    if body["email"] != STUDENT_EMAIL || body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }
    let cookie = format!("refresh_token={}; Path=/; HttpOnly", Uuid::new_v4());
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "access_token": gw.issue() })),
    )
        .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"].as_str().unwrap_or_default().is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing fields").into_response();
    }
    (
        StatusCode::CREATED,
        "Account created; check your inbox to verify your email",
    )
        .into_response()
}

async fn refresh(State(gw): State<Gateway>, headers: HeaderMap) -> Response {
    let has_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("refresh_token="));
    if !has_cookie {
        return (StatusCode::UNAUTHORIZED, "Missing refresh token").into_response();
    }
    Json(json!({ "accessToken": gw.issue() })).into_response()
}

async fn logout(State(gw): State<Gateway>) -> Response {
    if gw.knobs.logout_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "").into_response();
    }
    (
        [(header::SET_COOKIE, "refresh_token=; Path=/; Max-Age=0")],
        "Logged out",
    )
        .into_response()
}

async fn profile(State(gw): State<Gateway>, headers: HeaderMap) -> Response {
    if !gw.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": gw.student_id,
        "email": STUDENT_EMAIL,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "avatar": "",
        "verified": true,
    }))
    .into_response()
}

async fn update_profile(
    State(gw): State<Gateway>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> Response {
    if !gw.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "message": "User updated" })).into_response()
}

async fn delete_profile(State(gw): State<Gateway>, headers: HeaderMap) -> Response {
    if !gw.authorized(&headers) {
        return unauthorized();
    }
    "User deleted".into_response()
}

async fn verify(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("token").map(String::as_str) {
        None | Some("") => (StatusCode::BAD_REQUEST, "Token is required").into_response(),
        Some(token) if Uuid::parse_str(token).is_err() => {
            (StatusCode::BAD_REQUEST, "Invalid token").into_response()
        }
        Some(_) => "Email verified".into_response(),
    }
}

fn two_sum() -> Value {
    json!({
        "problem_id": "two-sum",
        "problem_title": "Two Sum",
        "difficulty": "Easy",
        "topics": ["arrays", "hashing"],
        "description": "Return the indices of the two numbers that add up to target.",
        "examples": "[{\"input\":\"nums = [2,7,11,15], target = 9\",\"output\":\"[0,1]\"}]",
        "constraints": ["2 <= nums.length <= 10^4"],
        "test_cases": "[{\"input\":[[2,7,11,15],9],\"output\":\"[0,1]\",\"hidden\":false}]",
        "return_type": "string",
        "function_name": "twoSum",
        "hint": "A hash map remembers what you have seen.",
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    })
}

async fn problems() -> Json<Value> {
    Json(json!([
        two_sum(),
        {
            "problem_id": "valid-brackets",
            "problem_title": "Valid Brackets",
            "difficulty": "Medium",
            "topics": ["stack"],
            "description": "Decide whether the brackets are balanced.",
            "examples": [{ "input": "\"()[]\"", "output": "true", "explanation": "Each opener closes." }],
            "constraints": [],
            "test_cases": [{ "input": ["(]"], "output": false, "hidden": true }],
            "return_type": "boolean",
            "function_name": "isValid",
            "hint": "",
            "createdAt": "2024-03-02T10:00:00Z",
            "updatedAt": "2024-03-02T10:00:00Z"
        }
    ]))
}

async fn problem(Path(id): Path<String>) -> Response {
    if id == "two-sum" {
        Json(two_sum()).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Problem not found" })),
        )
            .into_response()
    }
}

fn stored_submission(user_id: Uuid, status: &str) -> Value {
    let results = if status == "pending" {
        json!([])
    } else {
        json!([
            { "test_number": 1, "inputs": "[2,7,11,15], 9", "output": "[0,1]", "expected": "[0,1]",
              "passed": true, "stdout": "", "error": "", "timestamp": "2024-03-01T10:00:04Z" },
            { "test_number": 2, "inputs": "[3,3], 6", "output": "[0,1]", "expected": "[0,1]",
              "passed": true, "stdout": "", "error": "", "timestamp": "2024-03-01T10:00:05Z" }
        ])
        .to_string()
        .into()
    };
    json!({
        "submission_id": "sub-1",
        "user_id": user_id,
        "problem_id": "two-sum",
        "language": "python",
        "code": "def twoSum(nums, target): ...",
        "num_tests": 2,
        "function_name": "twoSum",
        "status": status,
        "results": results,
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-01T10:00:05Z"
    })
}

async fn submissions(State(gw): State<Gateway>, headers: HeaderMap) -> Response {
    if !gw.authorized(&headers) {
        return unauthorized();
    }
    Json(json!([stored_submission(gw.student_id, "passed")])).into_response()
}

async fn submit(State(gw): State<Gateway>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !gw.authorized(&headers) {
        return unauthorized();
    }
    let Some(user_id) = body["user_id"].as_str().and_then(|s| Uuid::parse_str(s).ok()) else {
        return (StatusCode::BAD_REQUEST, "Missing user_id").into_response();
    };
    *gw.knobs.last_submitter.lock().unwrap() = Some(user_id);
    (
        StatusCode::CREATED,
        Json(json!({ "submission_id": "sub-2", "status": "pending" })),
    )
        .into_response()
}

async fn submission(
    State(gw): State<Gateway>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !gw.authorized(&headers) {
        return unauthorized();
    }
    if id != "sub-1" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Submission not found" })),
        )
            .into_response();
    }
    let pending = gw
        .knobs
        .pending_polls
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    let status = if pending { "pending" } else { "passed" };
    Json(stored_submission(gw.student_id, status)).into_response()
}

async fn feedback(State(gw): State<Gateway>, headers: HeaderMap) -> Response {
    if !gw.authorized(&headers) {
        return unauthorized();
    }
    Json(json!("Both tests pass. A hash map gets you from O(n^2) to O(n).")).into_response()
}
