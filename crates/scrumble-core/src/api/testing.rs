// Scripted in-memory transport for tests. Records every request and answers
// from a per-route script instead of the network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Base URL the scripted routes are registered under.
pub const TEST_BASE: &str = "http://scrumble.test";

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method` + `path` (relative to `TEST_BASE`).
    /// The last queued answer for a route repeats forever.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(
            method,
            path,
            Scripted::Respond(HttpResponse {
                status,
                body: body.to_string(),
            }),
        )
    }

    /// Queue a transport-level failure for `method` + `path`.
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Scripted::Fail(message.to_string()))
    }

    fn push(&self, method: Method, path: &str, answer: Scripted) -> &Self {
        let url = format!("{TEST_BASE}{path}");
        self.routes
            .lock()
            .unwrap()
            .entry((method, url))
            .or_default()
            .push_back(answer);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests whose URL is `TEST_BASE + path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        let url = format!("{TEST_BASE}{path}");
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url == url)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method, request.url.clone());
        self.requests.lock().unwrap().push(request);

        // Yield once so concurrent callers observe the request as in flight.
        tokio::task::yield_now().await;

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match answer {
            Some(Scripted::Respond(resp)) => Ok(resp),
            Some(Scripted::Fail(message)) => Err(TransportError(message)),
            None => Ok(HttpResponse {
                status: 404,
                body: r#"{"error":"no scripted route"}"#.to_string(),
            }),
        }
    }
}
