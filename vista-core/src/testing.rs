//! Scripted doubles for the transport and the blocking UI ports.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::surface::{Confirmer, Level, Notifier};
use crate::transport::{ApiRequest, ApiResponse, Method, RestTransport};
use crate::{CoreError, CoreResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

type Scripted = Result<ApiResponse, String>;

/// In-process backend answering from scripted responses.
///
/// Responses for a route are served in order; the last one keeps being served,
/// so repeated refreshes see a stable collection. Unscripted routes get a 404
/// with an `{error}` body. Routes are keyed by method and `path?query`.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, target: &str, status: u16, body: Value) {
        self.push(method, target, Ok(ApiResponse::new(status, body)));
    }

    /// The route fails before any response arrives.
    pub fn fail(&self, method: Method, target: &str, message: &str) {
        self.push(method, target, Err(message.to_string()));
    }

    fn push(&self, method: Method, target: &str, scripted: Scripted) {
        lock(&self.routes)
            .entry((method, target.to_string()))
            .or_default()
            .push_back(scripted);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    pub fn count(&self, method: Method, target: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.target() == target)
            .count()
    }
}

#[async_trait]
impl RestTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> CoreResult<ApiResponse> {
        let key = (request.method, request.target());
        lock(&self.requests).push(request);

        let scripted = {
            let mut routes = lock(&self.routes);
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match scripted {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(CoreError::Transport(message)),
            None => {
                let error = format!("No route for {} {}", key.0, key.1);
                Ok(ApiResponse::new(404, json!({ "error": error })))
            }
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        lock(&self.messages).clone()
    }

    pub fn last(&self) -> Option<(Level, String)> {
        lock(&self.messages).last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: Level, message: &str) {
        lock(&self.messages).push((level, message.to_string()));
    }
}

/// Answers every prompt the same way and remembers what was asked.
pub struct ScriptedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        lock(&self.prompts).push(prompt.to_string());
        self.answer
    }
}
