/// Scripted HTTP server on the loopback interface
///
/// Replies to the n-th request with the n-th scripted response; once the
/// script runs out the last response repeats. Every request's path and
/// headers are recorded for assertions.
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct StubResponse {
    status: u16,
    body: String,
    headers: Vec<(&'static str, String)>,
}

impl StubResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

struct StubState {
    script: Vec<StubResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubServer {
    base_url: String,
    state: Arc<StubState>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn start(script: Vec<StubResponse>) -> Self {
        assert!(!script.is_empty(), "stub server needs at least one response");
        let state = Arc::new(StubState {
            script,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(reply).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn reply(State(state): State<Arc<StubState>>, uri: Uri, headers: HeaderMap) -> Response {
    let index = {
        let mut requests = state.requests.lock().unwrap();
        requests.push(RecordedRequest {
            path: uri.path().to_string(),
            headers,
        });
        requests.len() - 1
    };
    let scripted = &state.script[index.min(state.script.len() - 1)];

    let status = StatusCode::from_u16(scripted.status).expect("Invalid scripted status");
    let mut response = (status, scripted.body.clone()).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        HeaderName::from_static("content-type"),
        HeaderValue::from_static("application/json"),
    );
    for (name, value) in &scripted.headers {
        response_headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(value).expect("Invalid scripted header value"),
        );
    }
    response
}
