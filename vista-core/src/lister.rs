use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error};

use crate::markup::{Fragment, Row};
use crate::surface::{Container, FilterSource, Level, Notifier};
use crate::transport::{ApiRequest, RestTransport};
use crate::{CoreError, CoreResult};

/// Fixed template turning records into rows for one target container.
pub trait ListView<T>: Send + Sync {
    fn row(&self, record: &T) -> Row;

    /// Placeholder when no record passes `includes`.
    fn empty(&self) -> Row;

    fn failure(&self, error: &CoreError) -> Row;

    /// Row filter for containers that show a slice of the snapshot.
    fn includes(&self, _record: &T) -> bool {
        true
    }

    /// Written before the fetch starts, when set.
    fn loading(&self) -> Option<Row> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Rendered { total: usize },
    Empty,
    Failed(String),
}

/// Anything that can re-fetch and re-render itself after a mutation.
#[async_trait]
pub trait Refresh: Send + Sync {
    async fn refresh(&self) -> RefreshOutcome;
}

/// Send a read and decode its JSON body. A non-2xx status is an error
/// carrying the server's `error` text.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn RestTransport,
    request: ApiRequest,
) -> CoreResult<T> {
    debug!("Fetching {}", request.target());

    let response = transport.execute(request).await?;
    if !response.is_success() {
        let message = response
            .reply()
            .error
            .unwrap_or_else(|| format!("Request failed with status {}", response.status));
        return Err(CoreError::Status {
            status: response.status,
            message,
        });
    }

    serde_json::from_value(response.body).map_err(|e| CoreError::Decode(e.to_string()))
}

struct Target<T> {
    container: Arc<dyn Container>,
    view: Arc<dyn ListView<T>>,
}

type SnapshotHook<T> = Box<dyn Fn(&[T]) + Send + Sync>;

/// Fetches a collection and fully replaces the rendered rows of its targets.
///
/// Refreshes are not serialized: two overlapping calls both render, and the
/// one that completes last wins.
pub struct Lister<T> {
    endpoint: String,
    transport: Arc<dyn RestTransport>,
    targets: Vec<Target<T>>,
    filter: Option<Arc<dyn FilterSource>>,
    alerts: Option<(Arc<dyn Notifier>, String)>,
    hooks: Vec<SnapshotHook<T>>,
}

impl<T> Lister<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn RestTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
            targets: Vec::new(),
            filter: None,
            alerts: None,
            hooks: Vec::new(),
        }
    }

    pub fn target(mut self, container: Arc<dyn Container>, view: Arc<dyn ListView<T>>) -> Self {
        self.targets.push(Target { container, view });
        self
    }

    pub fn filtered_by(mut self, filter: Arc<dyn FilterSource>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Also raise a danger alert, prefixed, when the fetch fails.
    pub fn alert_failures(mut self, notifier: Arc<dyn Notifier>, prefix: &str) -> Self {
        self.alerts = Some((notifier, prefix.to_string()));
        self
    }

    /// Run after every successful render with the fresh snapshot.
    pub fn on_snapshot(mut self, hook: impl Fn(&[T]) + Send + Sync + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub async fn fetch(&self) -> CoreResult<Vec<T>> {
        let mut request = ApiRequest::get(self.endpoint.clone());
        if let Some((key, value)) = self.filter.as_ref().and_then(|f| f.filter()) {
            request = request.with_query(key, value);
        }
        fetch_json(self.transport.as_ref(), request).await
    }

    /// Replace every target's content from this snapshot.
    pub fn render(&self, records: &[T]) {
        for target in &self.targets {
            let mut rows: Vec<Row> = records
                .iter()
                .filter(|r| target.view.includes(r))
                .map(|r| target.view.row(r))
                .collect();
            if rows.is_empty() {
                rows.push(target.view.empty());
            }
            target.container.replace(Fragment::new(rows));
        }
    }

    fn render_failure(&self, err: &CoreError) {
        for target in &self.targets {
            target.container.replace(Fragment::new(vec![target.view.failure(err)]));
        }
    }
}

#[async_trait]
impl<T> Refresh for Lister<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn refresh(&self) -> RefreshOutcome {
        for target in &self.targets {
            if let Some(row) = target.view.loading() {
                target.container.replace(Fragment::new(vec![row]));
            }
        }

        match self.fetch().await {
            Ok(records) => {
                self.render(&records);
                for hook in &self.hooks {
                    hook(&records);
                }
                if records.is_empty() {
                    RefreshOutcome::Empty
                } else {
                    RefreshOutcome::Rendered { total: records.len() }
                }
            }
            Err(err) => {
                error!("Error fetching {}: {}", self.endpoint, err);
                self.render_failure(&err);
                if let Some((notifier, prefix)) = &self.alerts {
                    notifier.notify(Level::Danger, &format!("{}{}", prefix, err));
                }
                RefreshOutcome::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{RowAction, RowEvent, Trigger};
    use crate::surface::{MemoryContainer, MemorySelect, Select, SelectFilter, SelectOption};
    use crate::testing::{MockTransport, RecordingNotifier};
    use crate::Method;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize)]
    struct Item {
        id: i64,
        name: String,
        done: bool,
    }

    struct ItemView {
        done: Option<bool>,
    }

    impl ListView<Item> for ItemView {
        fn row(&self, item: &Item) -> Row {
            let event = RowEvent::new(RowAction::Delete, item.id, json!({}));
            let delete = Trigger::new("item", "Delete", event);
            Row::new(format!("<li>{}{}</li>", item.name, delete.button()), vec![delete])
        }

        fn empty(&self) -> Row {
            Row::placeholder("<li>Nothing here</li>".to_string())
        }

        fn failure(&self, _error: &CoreError) -> Row {
            Row::placeholder("<li class=\"error\">Error loading items</li>".to_string())
        }

        fn includes(&self, item: &Item) -> bool {
            self.done.map_or(true, |d| item.done == d)
        }
    }

    fn items() -> serde_json::Value {
        json!([
            {"id": 1, "name": "one", "done": false},
            {"id": 2, "name": "two", "done": true}
        ])
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent_full_replace() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/items", 200, items());
        let container = MemoryContainer::new();
        let lister = Lister::<Item>::new("/items", transport.clone())
            .target(container.clone(), Arc::new(ItemView { done: None }));

        assert_eq!(lister.refresh().await, RefreshOutcome::Rendered { total: 2 });
        let first = container.html();
        lister.refresh().await;

        assert_eq!(container.html(), first);
        assert_eq!(container.fragment().entity_ids(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_collection_renders_placeholder() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/items", 200, json!([]));
        let container = MemoryContainer::new();
        let lister = Lister::<Item>::new("/items", transport.clone())
            .target(container.clone(), Arc::new(ItemView { done: None }));

        assert_eq!(lister.refresh().await, RefreshOutcome::Empty);
        assert_eq!(container.html(), "<li>Nothing here</li>");
    }

    #[tokio::test]
    async fn test_fan_out_filters_each_target() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/items", 200, json!([{"id": 1, "name": "one", "done": false}]));
        let open = MemoryContainer::new();
        let closed = MemoryContainer::new();
        let lister = Lister::<Item>::new("/items", transport.clone())
            .target(open.clone(), Arc::new(ItemView { done: Some(false) }))
            .target(closed.clone(), Arc::new(ItemView { done: Some(true) }));

        lister.refresh().await;

        assert_eq!(open.fragment().entity_ids(), vec![1]);
        assert_eq!(closed.html(), "<li>Nothing here</li>");
    }

    #[tokio::test]
    async fn test_failure_renders_error_row_and_alerts() {
        let transport = MockTransport::new();
        transport.fail(Method::Get, "/items", "connection refused");
        let container = MemoryContainer::new();
        let notifier = RecordingNotifier::new();
        let lister = Lister::<Item>::new("/items", transport.clone())
            .target(container.clone(), Arc::new(ItemView { done: None }))
            .alert_failures(notifier.clone(), "Error loading items: ");

        let outcome = lister.refresh().await;

        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert!(container.html().contains("Error loading items"));
        assert_eq!(
            notifier.messages(),
            vec![(
                Level::Danger,
                "Error loading items: Network error: connection refused".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_is_a_failure() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/items", 200, json!({"unexpected": true}));
        let container = MemoryContainer::new();
        let lister = Lister::<Item>::new("/items", transport.clone())
            .target(container.clone(), Arc::new(ItemView { done: None }));

        assert!(matches!(lister.refresh().await, RefreshOutcome::Failed(_)));
        assert!(container.html().contains("error"));
    }

    #[tokio::test]
    async fn test_filter_and_snapshot_hook() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/items?kind=2", 200, items());
        let select = MemorySelect::with_placeholder("Any");
        select.set_options(vec![SelectOption::new("", "Any"), SelectOption::new("2", "Two")]);
        select.set_value("2");

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let lister = Lister::<Item>::new("/items", transport.clone())
            .target(MemoryContainer::new(), Arc::new(ItemView { done: None }))
            .filtered_by(Arc::new(SelectFilter::new(select, "kind")))
            .on_snapshot(move |records| {
                counter.store(records.len(), Ordering::SeqCst);
            });

        lister.refresh().await;

        assert_eq!(transport.count(Method::Get, "/items?kind=2"), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_json_status_without_error_body() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/items", 503, json!(null));

        let result = fetch_json::<Vec<Item>>(&*transport, ApiRequest::get("/items")).await;

        assert_eq!(
            result.unwrap_err(),
            CoreError::Status {
                status: 503,
                message: "Request failed with status 503".to_string()
            }
        );
    }
}
