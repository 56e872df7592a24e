use serde_json::Value;

/// Escape text for element content and attribute values alike.
pub fn escape(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// What a row trigger does when activated.
#[derive(Debug, Clone, PartialEq)]
pub enum RowAction {
    Edit,
    /// Choose the entity as the subject of a follow-up form (e.g. "Book").
    Select,
    Delete,
    SetStatus(String),
}

impl RowAction {
    fn slug(&self) -> &str {
        match self {
            RowAction::Edit => "edit",
            RowAction::Select => "select",
            RowAction::Delete => "delete",
            RowAction::SetStatus(status) => status,
        }
    }
}

/// Structured payload carried by a trigger: action, entity id and a snapshot
/// of the record as rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEvent {
    pub action: RowAction,
    pub entity_id: i64,
    pub snapshot: Value,
}

impl RowEvent {
    pub fn new(action: RowAction, entity_id: i64, snapshot: Value) -> Self {
        Self {
            action,
            entity_id,
            snapshot,
        }
    }

    /// String field of the snapshot, empty when absent.
    pub fn text(&self, field: &str) -> String {
        match self.snapshot.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub key: String,
    pub label: String,
    pub class: String,
    pub enabled: bool,
    pub event: RowEvent,
}

impl Trigger {
    /// Keys look like `destination:3:delete` or `booking:1:confirmed`.
    pub fn new(scope: &str, label: &str, event: RowEvent) -> Self {
        Self {
            key: format!("{}:{}:{}", scope, event.entity_id, event.action.slug()),
            label: label.to_string(),
            class: String::new(),
            enabled: true,
            event,
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn button(&self) -> String {
        let mut html = format!("<button data-trigger=\"{}\"", escape(&self.key));
        if !self.class.is_empty() {
            html.push_str(&format!(" class=\"{}\"", escape(&self.class)));
        }
        if !self.enabled {
            html.push_str(" disabled");
        }
        html.push('>');
        html.push_str(&escape(&self.label));
        html.push_str("</button>");
        html
    }
}

/// One visual unit of a list: a table row, a card, or a placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub html: String,
    pub triggers: Vec<Trigger>,
}

impl Row {
    pub fn new(html: String, triggers: Vec<Trigger>) -> Self {
        Self { html, triggers }
    }

    pub fn placeholder(html: String) -> Self {
        Self::new(html, Vec::new())
    }
}

/// The full content of a container. Rendering replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub rows: Vec<Row>,
}

impl Fragment {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn html(&self) -> String {
        self.rows.iter().map(|r| r.html.as_str()).collect::<Vec<_>>().join("\n")
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.rows.iter().flat_map(|r| r.triggers.iter())
    }

    pub fn trigger(&self, key: &str) -> Option<&Trigger> {
        self.triggers().find(|t| t.key == key)
    }

    /// Event of an enabled trigger; disabled controls cannot fire.
    pub fn activate(&self, key: &str) -> Option<RowEvent> {
        self.trigger(key).filter(|t| t.enabled).map(|t| t.event.clone())
    }

    /// Entity ids of rows that carry at least one trigger, in render order.
    pub fn entity_ids(&self) -> Vec<i64> {
        self.rows
            .iter()
            .filter_map(|r| r.triggers.first().map(|t| t.event.entity_id))
            .collect()
    }
}
