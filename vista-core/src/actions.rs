use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::form::{mutate, Feedback, SuccessRule};
use crate::guard::InFlightGuard;
use crate::lister::Refresh;
use crate::markup::{RowAction, RowEvent};
use crate::surface::{Confirmer, Container, FormValues, Level, Notifier};
use crate::toggle::EditPanel;
use crate::transport::{ApiRequest, Method, RestTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Edit,
    Select,
    Delete,
    SetStatus,
}

impl From<&RowAction> for ActionKind {
    fn from(action: &RowAction) -> Self {
        match action {
            RowAction::Edit => ActionKind::Edit,
            RowAction::Select => ActionKind::Select,
            RowAction::Delete => ActionKind::Delete,
            RowAction::SetStatus(_) => ActionKind::SetStatus,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// A panel was opened; nothing was sent.
    Opened,
    /// The user declined the confirmation prompt.
    Declined,
    /// The same action is still pending.
    Busy,
    /// The entity to act on no longer exists.
    Missing(String),
    /// The trigger's payload could not be shaped into a request; nothing was sent.
    Rejected(String),
    /// No handler is registered for this action.
    Unhandled,
    Completed { message: Option<String> },
    Failed(String),
}

impl ActionOutcome {
    /// A request went out, so the list is stale.
    pub fn mutated(&self) -> bool {
        matches!(self, ActionOutcome::Completed { .. } | ActionOutcome::Failed(_))
    }
}

#[async_trait]
pub trait RowHandler: Send + Sync {
    async fn handle(&self, event: &RowEvent) -> ActionOutcome;
}

/// Typed registry routing row events to their handler, then refreshing the
/// list after anything that issued a request.
pub struct ActionDispatcher {
    handlers: HashMap<ActionKind, Arc<dyn RowHandler>>,
    refresh: Arc<dyn Refresh>,
}

impl ActionDispatcher {
    pub fn new(refresh: Arc<dyn Refresh>) -> Self {
        Self {
            handlers: HashMap::new(),
            refresh,
        }
    }

    pub fn on(mut self, kind: ActionKind, handler: Arc<dyn RowHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub async fn dispatch(&self, event: RowEvent) -> ActionOutcome {
        let kind = ActionKind::from(&event.action);
        let Some(handler) = self.handlers.get(&kind) else {
            debug!("No handler for {:?}", kind);
            return ActionOutcome::Unhandled;
        };

        let outcome = handler.handle(&event).await;
        if outcome.mutated() {
            self.refresh.refresh().await;
        }
        outcome
    }

    /// Fire the trigger rendered under `key`; `None` if it is absent or disabled.
    pub async fn activate(&self, container: &dyn Container, key: &str) -> Option<ActionOutcome> {
        let event = container.activate(key)?;
        Some(self.dispatch(event).await)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Confirm, then `DELETE {endpoint}/{id}`.
pub struct DeleteHandler {
    endpoint: String,
    prompt: String,
    transport: Arc<dyn RestTransport>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
    rule: SuccessRule,
    feedback: Feedback,
    notify_success: bool,
    guard: InFlightGuard,
}

impl DeleteHandler {
    pub fn new(
        endpoint: &str,
        prompt: &str,
        transport: Arc<dyn RestTransport>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            prompt: prompt.to_string(),
            transport,
            confirmer,
            notifier,
            rule: SuccessRule::HttpOk,
            feedback: Feedback::server_message(),
            notify_success: false,
            guard: InFlightGuard::new(),
        }
    }

    /// Judge with `rule` and announce success with `feedback`.
    pub fn announce(mut self, rule: SuccessRule, feedback: Feedback) -> Self {
        self.rule = rule;
        self.feedback = feedback;
        self.notify_success = true;
        self
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }
}

#[async_trait]
impl RowHandler for DeleteHandler {
    async fn handle(&self, event: &RowEvent) -> ActionOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            debug!(
                "Delete of {}/{} ignored, previous one pending",
                self.endpoint, event.entity_id
            );
            return ActionOutcome::Busy;
        };
        if !self.confirmer.confirm(&self.prompt) {
            debug!("Delete of {}/{} declined", self.endpoint, event.entity_id);
            return ActionOutcome::Declined;
        }

        let request = ApiRequest::delete(format!("{}/{}", self.endpoint, event.entity_id));
        match mutate(self.transport.as_ref(), request, self.rule, &self.feedback).await {
            Ok(message) => {
                if self.notify_success {
                    if let Some(text) = &message {
                        self.notifier.notify(Level::Success, text);
                    }
                }
                ActionOutcome::Completed { message }
            }
            Err(text) => {
                self.notifier.notify(Level::Danger, &text);
                ActionOutcome::Failed(text)
            }
        }
    }
}

type StatusBody = Box<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// `PUT {endpoint}/{id}` with a typed status body and nothing else.
pub struct StatusHandler {
    endpoint: String,
    transport: Arc<dyn RestTransport>,
    notifier: Arc<dyn Notifier>,
    body: StatusBody,
    guard: InFlightGuard,
}

impl StatusHandler {
    /// `shape` turns the trigger's status slug into the request payload.
    pub fn new<P, F>(
        endpoint: &str,
        transport: Arc<dyn RestTransport>,
        notifier: Arc<dyn Notifier>,
        shape: F,
    ) -> Self
    where
        P: Serialize,
        F: Fn(&str) -> Result<P, String> + Send + Sync + 'static,
    {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            transport,
            notifier,
            body: Box::new(move |status| {
                let payload = shape(status)?;
                serde_json::to_value(payload).map_err(|e| e.to_string())
            }),
            guard: InFlightGuard::new(),
        }
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }
}

#[async_trait]
impl RowHandler for StatusHandler {
    async fn handle(&self, event: &RowEvent) -> ActionOutcome {
        let RowAction::SetStatus(status) = &event.action else {
            return ActionOutcome::Unhandled;
        };
        let Some(_permit) = self.guard.try_acquire() else {
            debug!(
                "Status change of {}/{} ignored, previous one pending",
                self.endpoint, event.entity_id
            );
            return ActionOutcome::Busy;
        };
        let body = match (self.body)(status) {
            Ok(body) => body,
            Err(reason) => {
                warn!(
                    "Status '{}' for {}/{} rejected: {}",
                    status, self.endpoint, event.entity_id, reason
                );
                self.notifier.notify(Level::Warning, &reason);
                return ActionOutcome::Rejected(reason);
            }
        };

        info!("Setting {}/{} to {}", self.endpoint, event.entity_id, status);
        let path = format!("{}/{}", self.endpoint, event.entity_id);
        let request = ApiRequest::new(Method::Put, path).with_json(body);
        let feedback = Feedback::server_message();
        match mutate(self.transport.as_ref(), request, SuccessRule::HttpOk, &feedback).await {
            Ok(message) => ActionOutcome::Completed { message },
            Err(text) => {
                self.notifier.notify(Level::Danger, &text);
                ActionOutcome::Failed(text)
            }
        }
    }
}

type Prefill = Box<dyn Fn(&RowEvent) -> FormValues + Send + Sync>;

/// Opens an edit panel pre-filled from the row snapshot.
pub struct PrefillHandler {
    panel: EditPanel,
    prefill: Prefill,
}

impl PrefillHandler {
    pub fn new(
        panel: EditPanel,
        prefill: impl Fn(&RowEvent) -> FormValues + Send + Sync + 'static,
    ) -> Self {
        Self {
            panel,
            prefill: Box::new(prefill),
        }
    }
}

#[async_trait]
impl RowHandler for PrefillHandler {
    async fn handle(&self, event: &RowEvent) -> ActionOutcome {
        self.panel.open((self.prefill)(event));
        ActionOutcome::Opened
    }
}
