//! Ports to the UI elements a screen drives, plus in-memory implementations.
//!
//! Screens receive these handles at construction; nothing is looked up by id.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::markup::{Fragment, RowEvent};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicked render must not take the whole surface down with it.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// ============================================================================
// Ports
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Danger,
}

/// User-visible alert channel (blocking dialog or inline banner).
pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, message: &str);
}

/// Blocking yes/no prompt.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A region whose content is replaced wholesale by each render.
pub trait Container: Send + Sync {
    fn replace(&self, fragment: Fragment);

    fn fragment(&self) -> Fragment;

    fn html(&self) -> String {
        self.fragment().html()
    }

    fn activate(&self, key: &str) -> Option<RowEvent> {
        self.fragment().activate(key)
    }
}

pub trait Panel: Send + Sync {
    fn show(&self);
    fn hide(&self);
    fn is_visible(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
    File(FileUpload),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }
}

pub type FormValues = BTreeMap<String, FieldValue>;

pub trait FormSurface: Send + Sync {
    fn values(&self) -> FormValues;

    /// Overwrite the given fields; fields not mentioned keep their value.
    fn fill(&self, values: FormValues);

    fn reset(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

pub trait Select: Send + Sync {
    fn options(&self) -> Vec<SelectOption>;

    /// Replace all options; the selection falls back to the first option.
    fn set_options(&self, options: Vec<SelectOption>);

    fn value(&self) -> String;

    /// Select the option with this value, or nothing when there is none.
    fn set_value(&self, value: &str);
}

/// Refill a select from a snapshot, keeping its leading placeholder (or
/// creating one) and the user's current selection when it still exists.
pub fn repopulate(select: &dyn Select, placeholder: &str, entries: Vec<SelectOption>) {
    let current = select.value();
    let first = select
        .options()
        .into_iter()
        .next()
        .unwrap_or_else(|| SelectOption::new("", placeholder));

    let mut options = Vec::with_capacity(entries.len() + 1);
    options.push(first);
    options.extend(entries);
    select.set_options(options);

    if !current.is_empty() {
        select.set_value(&current);
    }
}

/// Supplies the optional query filter of a list endpoint.
pub trait FilterSource: Send + Sync {
    fn filter(&self) -> Option<(String, String)>;
}

/// Uses a select's value as a query parameter; an empty value means no filter.
pub struct SelectFilter {
    select: Arc<dyn Select>,
    param: String,
}

impl SelectFilter {
    pub fn new(select: Arc<dyn Select>, param: &str) -> Self {
        Self {
            select,
            param: param.to_string(),
        }
    }
}

impl FilterSource for SelectFilter {
    fn filter(&self) -> Option<(String, String)> {
        let value = self.select.value();
        if value.trim().is_empty() {
            None
        } else {
            Some((self.param.clone(), value))
        }
    }
}

// ============================================================================
// In-memory surfaces
// ============================================================================

#[derive(Default)]
pub struct MemoryContainer {
    fragment: Mutex<Fragment>,
}

impl MemoryContainer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl Container for MemoryContainer {
    fn replace(&self, fragment: Fragment) {
        *lock(&self.fragment) = fragment;
    }

    fn fragment(&self) -> Fragment {
        lock(&self.fragment).clone()
    }
}

#[derive(Default)]
pub struct MemoryPanel {
    visible: AtomicBool,
}

impl MemoryPanel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl Panel for MemoryPanel {
    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct SelectState {
    options: Vec<SelectOption>,
    selected: Option<usize>,
}

#[derive(Default)]
pub struct MemorySelect {
    state: Mutex<SelectState>,
}

impl MemorySelect {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_placeholder(label: &str) -> Arc<Self> {
        let select = Self::default();
        select.set_options(vec![SelectOption::new("", label)]);
        Arc::new(select)
    }
}

impl Select for MemorySelect {
    fn options(&self) -> Vec<SelectOption> {
        lock(&self.state).options.clone()
    }

    fn set_options(&self, options: Vec<SelectOption>) {
        let mut state = lock(&self.state);
        state.selected = if options.is_empty() { None } else { Some(0) };
        state.options = options;
    }

    fn value(&self) -> String {
        let state = lock(&self.state);
        state
            .selected
            .and_then(|i| state.options.get(i))
            .map(|o| o.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        let mut state = lock(&self.state);
        state.selected = state.options.iter().position(|o| o.value == value);
    }
}

/// Form fields held in memory. Fields bound to a [`Select`] read and write
/// through it, like a `<select>` inside a `<form>`.
#[derive(Default)]
pub struct MemoryForm {
    values: Mutex<FormValues>,
    selects: Vec<(String, Arc<dyn Select>)>,
}

impl MemoryForm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_selects(selects: Vec<(&str, Arc<dyn Select>)>) -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(FormValues::new()),
            selects: selects.into_iter().map(|(name, s)| (name.to_string(), s)).collect(),
        })
    }

    pub fn set(&self, name: &str, value: FieldValue) {
        if let Some((_, select)) = self.selects.iter().find(|(n, _)| n == name) {
            if let FieldValue::Text(text) = &value {
                select.set_value(text);
            }
            return;
        }
        lock(&self.values).insert(name.to_string(), value);
    }

    pub fn set_text(&self, name: &str, value: &str) {
        self.set(name, FieldValue::text(value));
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.values().remove(name)
    }
}

impl FormSurface for MemoryForm {
    fn values(&self) -> FormValues {
        let mut values = lock(&self.values).clone();
        for (name, select) in &self.selects {
            values.insert(name.clone(), FieldValue::Text(select.value()));
        }
        values
    }

    fn fill(&self, values: FormValues) {
        for (name, value) in values {
            self.set(&name, value);
        }
    }

    fn reset(&self) {
        lock(&self.values).clear();
        for (_, select) in &self.selects {
            let first = select.options().into_iter().next();
            select.set_value(first.map(|o| o.value).as_deref().unwrap_or(""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repopulate_keeps_placeholder_and_selection() {
        let select = MemorySelect::with_placeholder("Filter by destination");
        select.set_options(vec![
            SelectOption::new("", "Filter by destination"),
            SelectOption::new("1", "Dublin"),
            SelectOption::new("2", "Cork"),
        ]);
        select.set_value("2");

        repopulate(
            &*select,
            "Select Destination",
            vec![SelectOption::new("2", "Cork"), SelectOption::new("3", "Galway")],
        );

        let options = select.options();
        assert_eq!(options[0].label, "Filter by destination");
        assert_eq!(options.len(), 3);
        assert_eq!(select.value(), "2");
    }

    #[test]
    fn test_repopulate_creates_placeholder_when_empty() {
        let select = MemorySelect::new();
        repopulate(&*select, "Select Destination", vec![SelectOption::new("5", "Sligo")]);

        assert_eq!(select.options()[0], SelectOption::new("", "Select Destination"));
        assert_eq!(select.value(), "");
    }

    #[test]
    fn test_select_filter_skips_empty_value() {
        let select = MemorySelect::with_placeholder("All");
        let filter = SelectFilter::new(select.clone(), "destination_id");
        assert_eq!(filter.filter(), None);

        repopulate(&*select, "All", vec![SelectOption::new("4", "Kerry")]);
        select.set_value("4");
        assert_eq!(filter.filter(), Some(("destination_id".to_string(), "4".to_string())));
    }

    #[test]
    fn test_form_reset_clears_fields_and_selects() {
        let select = MemorySelect::with_placeholder("Select Destination");
        repopulate(&*select, "Select Destination", vec![SelectOption::new("1", "Dublin")]);
        let form =
            MemoryForm::with_selects(vec![("destination_id", select.clone() as Arc<dyn Select>)]);

        form.set_text("name", "Hall");
        form.set_text("destination_id", "1");
        assert_eq!(form.get("destination_id"), Some(FieldValue::text("1")));

        form.reset();
        assert_eq!(form.get("name"), None);
        assert_eq!(select.value(), "");
    }
}
