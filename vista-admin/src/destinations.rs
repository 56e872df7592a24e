use std::sync::Arc;
use vista_core::markup::escape;
use vista_core::surface::{repopulate, SelectOption};
use vista_core::{
    ActionDispatcher, ActionKind, ActionOutcome, Container, CoreError, DeleteHandler, EditPanel,
    Feedback, Field, FieldKind, FieldValue, FormSchema, FormSubmitter, FormSurface, ListView,
    Lister, Method, Panel, PrefillHandler, Refresh, RefreshOutcome, Row, RowAction, RowEvent,
    Select, Trigger,
};
use vista_shared::{Destination, DestinationPayload};

use crate::{form_values, snapshot, AdminState};

pub const ENDPOINT: &str = "/api/destinations";

/// Surfaces of the destination section of the admin page.
pub struct DestinationsUi {
    pub list: Arc<dyn Container>,
    pub add_form: Arc<dyn FormSurface>,
    pub edit_form: Arc<dyn FormSurface>,
    pub edit_panel: Arc<dyn Panel>,
    /// Selects listing destinations elsewhere on the page (add venue, venue filter).
    pub destination_selects: Vec<Arc<dyn Select>>,
}

struct DestinationCards;

impl ListView<Destination> for DestinationCards {
    fn row(&self, d: &Destination) -> Row {
        let data = snapshot(d);
        let edit = RowEvent::new(RowAction::Edit, d.id, data.clone());
        let edit = Trigger::new("destination", "Edit", edit).class("btn-edit");
        let delete = RowEvent::new(RowAction::Delete, d.id, data);
        let delete = Trigger::new("destination", "Delete", delete).class("btn-delete");

        let html = format!(
            "<div class=\"admin-card\">\
             <div class=\"admin-card-content\"><h3>{} <small>- {}</small></h3><p>{}</p></div>\
             <div class=\"admin-card-actions\">{}{}</div>\
             </div>",
            escape(&d.name),
            d.availability_label(),
            escape(&d.description),
            edit.button(),
            delete.button(),
        );
        Row::new(html, vec![edit, delete])
    }

    fn empty(&self) -> Row {
        Row::placeholder("<p class=\"empty-state\">No destinations found</p>".to_string())
    }

    fn failure(&self, _error: &CoreError) -> Row {
        Row::placeholder("<p class=\"error-state\">Error loading destinations</p>".to_string())
    }
}

fn add_schema() -> FormSchema {
    FormSchema::new(vec![
        Field::new("name", FieldKind::Text).required(),
        Field::new("description", FieldKind::Text).required(),
        Field::new("availability", FieldKind::Checkbox),
    ])
}

fn edit_schema() -> FormSchema {
    let mut fields = vec![Field::new("id", FieldKind::Hidden).required()];
    fields.extend(add_schema().fields().iter().cloned());
    FormSchema::new(fields)
}

pub struct DestinationsScreen {
    pub lister: Arc<Lister<Destination>>,
    pub add: FormSubmitter<DestinationPayload>,
    pub edit: FormSubmitter<DestinationPayload>,
    pub actions: ActionDispatcher,
    list: Arc<dyn Container>,
}

impl DestinationsScreen {
    pub fn new(state: &AdminState, ui: DestinationsUi) -> Self {
        let selects = ui.destination_selects;
        let lister = Arc::new(
            Lister::<Destination>::new(ENDPOINT, state.transport.clone())
                .target(ui.list.clone(), Arc::new(DestinationCards))
                .on_snapshot(move |destinations: &[Destination]| {
                    let options: Vec<SelectOption> = destinations
                        .iter()
                        .map(|d| SelectOption::new(d.id.to_string(), d.name.clone()))
                        .collect();
                    for select in &selects {
                        repopulate(select.as_ref(), "Select Destination", options.clone());
                    }
                }),
        );

        let add = FormSubmitter::<DestinationPayload>::new(
            add_schema(),
            Method::Post,
            ENDPOINT,
            state.transport.clone(),
            ui.add_form,
            state.notifier.clone(),
        )
        .feedback(Feedback::new("Destination Added"))
        .refreshes(lister.clone());

        let edit = FormSubmitter::<DestinationPayload>::new(
            edit_schema(),
            Method::Put,
            &format!("{}/{{id}}", ENDPOINT),
            state.transport.clone(),
            ui.edit_form.clone(),
            state.notifier.clone(),
        )
        .feedback(Feedback::new("Destination Updated"))
        .closes(ui.edit_panel.clone())
        .refreshes(lister.clone());

        let edit_panel = EditPanel::new(ui.edit_panel, ui.edit_form);
        let prefill = PrefillHandler::new(edit_panel, |event: &RowEvent| {
            let available = event.snapshot["availability"].as_bool().unwrap_or(false);
            form_values(vec![
                ("id", FieldValue::text(event.entity_id.to_string())),
                ("name", FieldValue::text(event.text("name"))),
                ("description", FieldValue::text(event.text("description"))),
                ("availability", FieldValue::Checked(available)),
            ])
        });
        let delete = DeleteHandler::new(
            ENDPOINT,
            "Delete destination?",
            state.transport.clone(),
            state.confirmer.clone(),
            state.notifier.clone(),
        );
        let actions = ActionDispatcher::new(lister.clone())
            .on(ActionKind::Edit, Arc::new(prefill))
            .on(ActionKind::Delete, Arc::new(delete));

        Self {
            lister,
            add,
            edit,
            actions,
            list: ui.list,
        }
    }

    pub async fn load(&self) -> RefreshOutcome {
        self.lister.refresh().await
    }

    pub async fn activate(&self, key: &str) -> Option<ActionOutcome> {
        self.actions.activate(self.list.as_ref(), key).await
    }

    pub fn html(&self) -> String {
        self.list.html()
    }
}
