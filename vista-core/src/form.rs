use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::guard::InFlightGuard;
use crate::lister::Refresh;
use crate::surface::{FieldValue, FormSurface, FormValues, Level, Notifier, Panel};
use crate::transport::{ApiRequest, ApiResponse, Body, FormPart, Method, RestTransport};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Select,
    Hidden,
    Integer,
    Decimal,
    Checkbox,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn is_missing(&self, value: Option<&FieldValue>) -> bool {
        match (self.kind, value) {
            (FieldKind::Checkbox, _) => false,
            (_, Some(FieldValue::Text(text))) => text.trim().is_empty(),
            (_, Some(FieldValue::File(file))) => file.file_name.is_empty(),
            (_, _) => true,
        }
    }

    fn to_json(&self, value: Option<&FieldValue>) -> Value {
        match (self.kind, value) {
            (FieldKind::Checkbox, Some(FieldValue::Checked(checked))) => Value::Bool(*checked),
            (FieldKind::Checkbox, Some(FieldValue::Text(text))) => {
                Value::Bool(matches!(text.trim(), "true" | "on" | "1" | "yes"))
            }
            (FieldKind::Checkbox, _) => Value::Bool(false),
            (FieldKind::Integer, Some(FieldValue::Text(text))) => {
                text.trim().parse::<i64>().map(Value::from).unwrap_or(Value::Null)
            }
            (FieldKind::Decimal, Some(FieldValue::Text(text))) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            (_, Some(FieldValue::Text(text))) if !text.trim().is_empty() => {
                Value::String(text.trim().to_string())
            }
            (_, _) => Value::Null,
        }
    }
}

/// The fields a form submits. Presence is the only rule enforced here; value
/// formats are left to the input widgets and the typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    fields: Vec<Field>,
}

impl FormSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn missing(&self, values: &FormValues) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.is_missing(values.get(f.name)))
            .map(|f| f.name)
            .collect()
    }

    /// JSON object of all non-file fields, skipping the ones named in `exclude`.
    pub fn to_json(&self, values: &FormValues, exclude: &[String]) -> Value {
        let mut object = Map::new();
        for field in &self.fields {
            if field.kind == FieldKind::File || exclude.iter().any(|e| e == field.name) {
                continue;
            }
            object.insert(field.name.to_string(), field.to_json(values.get(field.name)));
        }
        Value::Object(object)
    }

    fn files(&self, values: &FormValues) -> Vec<FormPart> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::File)
            .filter_map(|f| match values.get(f.name) {
                Some(FieldValue::File(file)) if !file.file_name.is_empty() => Some(FormPart::File {
                    name: f.name.to_string(),
                    file_name: file.file_name.clone(),
                    bytes: file.bytes.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// How a module recognises a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessRule {
    /// The body carries a `message` key.
    MessageKey,
    /// Any 2xx status.
    HttpOk,
}

impl SuccessRule {
    /// `Ok(server message)` on success, `Err(server error)` otherwise.
    pub fn judge(&self, response: &ApiResponse) -> Result<Option<String>, Option<String>> {
        let reply = response.reply();
        let ok = match self {
            SuccessRule::MessageKey => reply.message.is_some(),
            SuccessRule::HttpOk => response.is_success(),
        };
        if ok {
            Ok(reply.message)
        } else {
            Err(reply.error)
        }
    }
}

/// User-facing texts for the outcome of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Shown on success; `None` shows the server's own message.
    pub success: Option<String>,
    pub failure_prefix: String,
    /// Used when the server gives no `error`.
    pub fallback_error: String,
}

impl Feedback {
    pub fn new(success: &str) -> Self {
        Self {
            success: Some(success.to_string()),
            failure_prefix: String::new(),
            fallback_error: "Request failed".to_string(),
        }
    }

    pub fn server_message() -> Self {
        Self {
            success: None,
            ..Self::new("")
        }
    }

    pub fn on_failure(mut self, prefix: &str, fallback: &str) -> Self {
        self.failure_prefix = prefix.to_string();
        self.fallback_error = fallback.to_string();
        self
    }

    pub fn failure_text(&self, server_error: Option<String>) -> String {
        format!(
            "{}{}",
            self.failure_prefix,
            server_error.unwrap_or_else(|| self.fallback_error.clone())
        )
    }

    pub fn success_text(&self, server_message: Option<String>) -> Option<String> {
        self.success.clone().or(server_message)
    }
}

/// Send one mutation and judge it. Errors carry the user-facing text.
pub(crate) async fn mutate(
    transport: &dyn RestTransport,
    request: ApiRequest,
    rule: SuccessRule,
    feedback: &Feedback,
) -> Result<Option<String>, String> {
    let target = format!("{} {}", request.method, request.target());
    match transport.execute(request).await {
        Ok(response) => match rule.judge(&response) {
            Ok(message) => {
                info!("{} succeeded ({})", target, response.status);
                Ok(feedback.success_text(message))
            }
            Err(server_error) => {
                warn!("{} rejected ({}): {:?}", target, response.status, server_error);
                Err(feedback.failure_text(server_error))
            }
        },
        Err(err) => {
            error!("{} failed: {}", target, err);
            Err(feedback.failure_text(Some(err.to_string())))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A submission of this form is still pending.
    Busy,
    /// Validation failed; no request was issued.
    Rejected { reason: String },
    Submitted { message: Option<String> },
    Failed(String),
}

/// Binds a form to a create or update endpoint.
///
/// `P` is the typed payload; the field values are shaped into it before
/// sending, so a payload the backend cannot accept never leaves the client.
pub struct FormSubmitter<P> {
    schema: FormSchema,
    method: Method,
    path: String,
    transport: Arc<dyn RestTransport>,
    form: Arc<dyn FormSurface>,
    notifier: Arc<dyn Notifier>,
    rule: SuccessRule,
    feedback: Feedback,
    panel: Option<Arc<dyn Panel>>,
    refresh: Vec<Arc<dyn Refresh>>,
    guard: InFlightGuard,
    _payload: PhantomData<fn() -> P>,
}

impl<P> FormSubmitter<P>
where
    P: DeserializeOwned + Serialize,
{
    /// `path` may interpolate field values, e.g. `/api/venues/{id}`; those
    /// fields are left out of the body.
    pub fn new(
        schema: FormSchema,
        method: Method,
        path: &str,
        transport: Arc<dyn RestTransport>,
        form: Arc<dyn FormSurface>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            schema,
            method,
            path: path.to_string(),
            transport,
            form,
            notifier,
            rule: SuccessRule::MessageKey,
            feedback: Feedback::server_message(),
            panel: None,
            refresh: Vec::new(),
            guard: InFlightGuard::new(),
            _payload: PhantomData,
        }
    }

    pub fn success_rule(mut self, rule: SuccessRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }

    /// Panel to close after a successful submit.
    pub fn closes(mut self, panel: Arc<dyn Panel>) -> Self {
        self.panel = Some(panel);
        self
    }

    pub fn refreshes(mut self, target: Arc<dyn Refresh>) -> Self {
        self.refresh.push(target);
        self
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }

    fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.path.as_str();
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else { break };
            names.push(rest[start + 1..start + len].to_string());
            rest = &rest[start + len + 1..];
        }
        names
    }

    fn resolve_path(&self, values: &FormValues) -> String {
        let mut path = self.path.clone();
        for name in self.placeholders() {
            let value = match values.get(&name) {
                Some(FieldValue::Text(text)) => text.trim().to_string(),
                _ => String::new(),
            };
            path = path.replace(&format!("{{{}}}", name), &value);
        }
        path
    }

    /// Shape the values into `P` and build the request body.
    pub fn build_body(&self, values: &FormValues) -> CoreResult<Body> {
        let raw = self.schema.to_json(values, &self.placeholders());
        let payload: P =
            serde_json::from_value(raw).map_err(|e| CoreError::Validation(e.to_string()))?;
        let json =
            serde_json::to_value(&payload).map_err(|e| CoreError::Validation(e.to_string()))?;

        let files = self.schema.files(values);
        if files.is_empty() {
            return Ok(Body::Json(json));
        }

        let mut parts: Vec<FormPart> = json
            .as_object()
            .into_iter()
            .flat_map(|o| o.iter())
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| FormPart::Text {
                name: k.clone(),
                value: match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect();
        parts.extend(files);
        Ok(Body::Multipart(parts))
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            debug!("Submit to {} ignored, previous one pending", self.path);
            return SubmitOutcome::Busy;
        };

        let values = self.form.values();
        let missing = self.schema.missing(&values);
        if !missing.is_empty() {
            warn!("Submit to {} rejected, missing: {:?}", self.path, missing);
            self.notifier.notify(Level::Warning, "Please fill in all required fields");
            return SubmitOutcome::Rejected {
                reason: format!("missing {}", missing.join(", ")),
            };
        }

        let body = match self.build_body(&values) {
            Ok(body) => body,
            Err(err) => {
                warn!("Submit to {} rejected: {}", self.path, err);
                self.notifier.notify(Level::Warning, &err.to_string());
                return SubmitOutcome::Rejected { reason: err.to_string() };
            }
        };

        let request = ApiRequest::new(self.method, self.resolve_path(&values)).with_body(body);
        match mutate(self.transport.as_ref(), request, self.rule, &self.feedback).await {
            Ok(message) => {
                self.form.reset();
                if let Some(panel) = &self.panel {
                    panel.hide();
                }
                if let Some(text) = &message {
                    self.notifier.notify(Level::Success, text);
                }
                for target in &self.refresh {
                    target.refresh().await;
                }
                SubmitOutcome::Submitted { message }
            }
            Err(text) => {
                self.notifier.notify(Level::Danger, &text);
                SubmitOutcome::Failed(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::RefreshOutcome;
    use crate::surface::{FileUpload, MemoryForm, MemoryPanel};
    use crate::testing::{MockTransport, RecordingNotifier};
    use async_trait::async_trait;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Serialize, Deserialize)]
    struct Place {
        name: String,
        description: String,
        availability: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Hall {
        name: String,
        capacity: i64,
        price: f64,
    }

    #[derive(Default)]
    struct CountingRefresh(AtomicUsize);

    #[async_trait]
    impl Refresh for CountingRefresh {
        async fn refresh(&self) -> RefreshOutcome {
            self.0.fetch_add(1, Ordering::SeqCst);
            RefreshOutcome::Empty
        }
    }

    fn place_schema() -> FormSchema {
        FormSchema::new(vec![
            Field::new("name", FieldKind::Text).required(),
            Field::new("description", FieldKind::Text).required(),
            Field::new("availability", FieldKind::Checkbox),
        ])
    }

    struct Fixture {
        transport: Arc<MockTransport>,
        form: Arc<MemoryForm>,
        notifier: Arc<RecordingNotifier>,
        refresh: Arc<CountingRefresh>,
        submitter: FormSubmitter<Place>,
    }

    fn fixture(method: Method, path: &str) -> Fixture {
        let transport = MockTransport::new();
        let form = MemoryForm::new();
        let notifier = RecordingNotifier::new();
        let refresh = Arc::new(CountingRefresh::default());
        let mut schema = place_schema();
        schema.fields.push(Field::new("id", FieldKind::Hidden));
        let submitter = FormSubmitter::<Place>::new(
            schema,
            method,
            path,
            transport.clone(),
            form.clone(),
            notifier.clone(),
        )
        .refreshes(refresh.clone());
        Fixture {
            transport,
            form,
            notifier,
            refresh,
            submitter,
        }
    }

    #[rstest]
    #[case("", "Old town")]
    #[case("Dublin", "   ")]
    #[tokio::test]
    async fn test_missing_required_field_issues_no_request(
        #[case] name: &str,
        #[case] description: &str,
    ) {
        let fx = fixture(Method::Post, "/api/destinations");
        fx.form.set_text("name", name);
        fx.form.set_text("description", description);

        let outcome = fx.submitter.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));
        assert!(fx.transport.requests().is_empty());
        assert_eq!(fx.refresh.0.load(Ordering::SeqCst), 0);
        assert_eq!(
            fx.notifier.messages(),
            vec![(Level::Warning, "Please fill in all required fields".to_string())]
        );
    }

    #[tokio::test]
    async fn test_success_resets_and_refreshes_once() {
        let fx = fixture(Method::Post, "/api/destinations");
        let created = json!({"message": "Destination created"});
        fx.transport.on(Method::Post, "/api/destinations", 201, created);
        fx.form.set_text("name", "  Dublin ");
        fx.form.set_text("description", "Old town");
        fx.form.set("availability", FieldValue::Checked(true));

        let outcome = fx.submitter.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Submitted {
                message: Some("Destination created".to_string())
            }
        );
        assert_eq!(fx.refresh.0.load(Ordering::SeqCst), 1);
        assert_eq!(fx.form.get("name"), None);
        assert_eq!(
            fx.transport.requests()[0].body,
            Some(Body::Json(json!({
                "name": "Dublin",
                "description": "Old town",
                "availability": true
            })))
        );
    }

    #[tokio::test]
    async fn test_update_interpolates_id_and_closes_panel() {
        let panel = MemoryPanel::new();
        panel.show();
        let mut fx = fixture(Method::Put, "/api/destinations/{id}");
        fx.submitter = fx
            .submitter
            .closes(panel.clone())
            .feedback(Feedback::new("Destination Updated"));
        let updated = json!({"message": "Destination updated"});
        fx.transport.on(Method::Put, "/api/destinations/7", 200, updated);
        fx.form.set_text("id", "7");
        fx.form.set_text("name", "Cork");
        fx.form.set_text("description", "Rebel city");

        fx.submitter.submit().await;

        let body = fx.transport.requests()[0].body.clone();
        assert_eq!(
            body,
            Some(Body::Json(json!({
                "name": "Cork",
                "description": "Rebel city",
                "availability": false
            })))
        );
        assert!(!panel.is_visible());
        assert_eq!(
            fx.notifier.messages(),
            vec![(Level::Success, "Destination Updated".to_string())]
        );
    }

    #[tokio::test]
    async fn test_server_error_is_shown_verbatim() {
        let fx = fixture(Method::Post, "/api/destinations");
        fx.transport.on(Method::Post, "/api/destinations", 401, json!({"error": "Unauthorized"}));
        fx.form.set_text("name", "Dublin");
        fx.form.set_text("description", "Old town");

        let outcome = fx.submitter.submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed("Unauthorized".to_string()));
        assert_eq!(fx.refresh.0.load(Ordering::SeqCst), 0);
        assert_eq!(fx.form.get("name"), Some(FieldValue::text("Dublin")));
    }

    #[tokio::test]
    async fn test_http_ok_rule_with_prefixed_fallback() {
        let mut fx = fixture(Method::Post, "/vendors");
        fx.submitter = fx
            .submitter
            .success_rule(SuccessRule::HttpOk)
            .feedback(
                Feedback::new("Vendor added successfully!")
                    .on_failure("Error adding vendor: ", "Failed to add vendor"),
            );
        fx.transport.on(Method::Post, "/vendors", 500, json!(null));
        fx.form.set_text("name", "Cater Co");
        fx.form.set_text("description", "Food");

        let outcome = fx.submitter.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed("Error adding vendor: Failed to add vendor".to_string())
        );
    }

    #[tokio::test]
    async fn test_busy_guard_blocks_second_submit() {
        let fx = fixture(Method::Post, "/api/destinations");
        fx.form.set_text("name", "Dublin");
        fx.form.set_text("description", "Old town");

        let _pending = fx.submitter.guard().try_acquire().unwrap();
        assert_eq!(fx.submitter.submit().await, SubmitOutcome::Busy);
        assert!(fx.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_file_field_switches_to_multipart() {
        let transport = MockTransport::new();
        transport.on(Method::Post, "/api/venues", 201, json!({"message": "Venue created"}));
        let form = MemoryForm::new();
        form.set_text("name", "Hall");
        form.set_text("capacity", "120");
        form.set_text("price", "99.5");
        form.set(
            "image",
            FieldValue::File(FileUpload {
                file_name: "hall.png".to_string(),
                bytes: vec![1, 2, 3],
            }),
        );
        let schema = FormSchema::new(vec![
            Field::new("name", FieldKind::Text).required(),
            Field::new("capacity", FieldKind::Integer).required(),
            Field::new("price", FieldKind::Decimal).required(),
            Field::new("image", FieldKind::File),
        ]);
        let submitter = FormSubmitter::<Hall>::new(
            schema,
            Method::Post,
            "/api/venues",
            transport.clone(),
            form.clone(),
            RecordingNotifier::new(),
        );

        submitter.submit().await;

        let Some(Body::Multipart(parts)) = transport.requests()[0].body.clone() else {
            panic!("expected multipart body");
        };
        assert!(parts.contains(&FormPart::Text {
            name: "capacity".to_string(),
            value: "120".to_string()
        }));
        assert!(parts.contains(&FormPart::File {
            name: "image".to_string(),
            file_name: "hall.png".to_string(),
            bytes: vec![1, 2, 3]
        }));
    }

    #[test]
    fn test_unparseable_number_fails_payload_shaping() {
        let schema = FormSchema::new(vec![
            Field::new("name", FieldKind::Text).required(),
            Field::new("capacity", FieldKind::Integer).required(),
            Field::new("price", FieldKind::Decimal).required(),
        ]);
        let submitter = FormSubmitter::<Hall>::new(
            schema,
            Method::Post,
            "/api/venues",
            MockTransport::new(),
            MemoryForm::new(),
            RecordingNotifier::new(),
        );
        let mut values = FormValues::new();
        values.insert("name".to_string(), FieldValue::text("Hall"));
        values.insert("capacity".to_string(), FieldValue::text("lots"));
        values.insert("price".to_string(), FieldValue::text("10"));

        assert!(matches!(submitter.build_body(&values), Err(CoreError::Validation(_))));
    }
}
