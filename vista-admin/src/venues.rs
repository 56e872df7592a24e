use std::sync::Arc;
use vista_core::markup::escape;
use vista_core::{
    ActionDispatcher, ActionKind, ActionOutcome, Container, CoreError, DeleteHandler, EditPanel,
    Feedback, Field, FieldKind, FieldValue, FormSchema, FormSubmitter, FormSurface, ListView,
    Lister, Method, Panel, PrefillHandler, Refresh, RefreshOutcome, Row, RowAction, RowEvent,
    Select, SelectFilter, Trigger,
};
use vista_shared::{Venue, VenuePayload};

use crate::{form_values, snapshot, AdminState};

pub const ENDPOINT: &str = "/api/venues";

pub struct VenuesUi {
    pub list: Arc<dyn Container>,
    /// Destination filter; its value becomes `?destination_id=`.
    pub filter: Arc<dyn Select>,
    pub add_form: Arc<dyn FormSurface>,
    pub edit_form: Arc<dyn FormSurface>,
    pub edit_panel: Arc<dyn Panel>,
}

struct VenueCards;

impl ListView<Venue> for VenueCards {
    fn row(&self, v: &Venue) -> Row {
        let data = snapshot(v);
        let edit = RowEvent::new(RowAction::Edit, v.id, data.clone());
        let edit = Trigger::new("venue", "Edit", edit).class("btn-edit");
        let delete = RowEvent::new(RowAction::Delete, v.id, data);
        let delete = Trigger::new("venue", "Delete", delete).class("btn-delete");

        let html = format!(
            "<div class=\"admin-card\">\
             <div class=\"admin-card-content\"><h3>{}</h3><p>{}</p>\
             <p>Capacity: <strong>{}</strong> | Price: <strong>${}</strong></p></div>\
             <div class=\"admin-card-actions\">{}{}</div>\
             </div>",
            escape(&v.name),
            escape(v.destination_name.as_deref().unwrap_or("")),
            v.capacity,
            v.price,
            edit.button(),
            delete.button(),
        );
        Row::new(html, vec![edit, delete])
    }

    fn empty(&self) -> Row {
        Row::placeholder("<p class=\"empty-state\">No venues found</p>".to_string())
    }

    fn failure(&self, _error: &CoreError) -> Row {
        Row::placeholder("<p class=\"error-state\">Error loading venues</p>".to_string())
    }
}

fn add_schema() -> FormSchema {
    FormSchema::new(vec![
        Field::new("destination_id", FieldKind::Integer).required(),
        Field::new("name", FieldKind::Text).required(),
        Field::new("capacity", FieldKind::Integer).required(),
        Field::new("price", FieldKind::Decimal).required(),
        Field::new("image", FieldKind::File),
    ])
}

fn edit_schema() -> FormSchema {
    FormSchema::new(vec![
        Field::new("id", FieldKind::Hidden).required(),
        Field::new("destination_id", FieldKind::Integer).required(),
        Field::new("name", FieldKind::Text).required(),
        Field::new("capacity", FieldKind::Integer).required(),
        Field::new("price", FieldKind::Decimal).required(),
        Field::new("availability", FieldKind::Checkbox),
    ])
}

pub struct VenuesScreen {
    pub lister: Arc<Lister<Venue>>,
    pub add: FormSubmitter<VenuePayload>,
    pub edit: FormSubmitter<VenuePayload>,
    pub actions: ActionDispatcher,
    list: Arc<dyn Container>,
}

impl VenuesScreen {
    pub fn new(state: &AdminState, ui: VenuesUi) -> Self {
        let lister = Arc::new(
            Lister::<Venue>::new(ENDPOINT, state.transport.clone())
                .target(ui.list.clone(), Arc::new(VenueCards))
                .filtered_by(Arc::new(SelectFilter::new(ui.filter, "destination_id"))),
        );

        let add = FormSubmitter::<VenuePayload>::new(
            add_schema(),
            Method::Post,
            ENDPOINT,
            state.transport.clone(),
            ui.add_form,
            state.notifier.clone(),
        )
        .feedback(Feedback::new("Venue Added"))
        .refreshes(lister.clone());

        let edit = FormSubmitter::<VenuePayload>::new(
            edit_schema(),
            Method::Put,
            &format!("{}/{{id}}", ENDPOINT),
            state.transport.clone(),
            ui.edit_form.clone(),
            state.notifier.clone(),
        )
        .feedback(Feedback::new("Venue Updated"))
        .closes(ui.edit_panel.clone())
        .refreshes(lister.clone());

        let edit_panel = EditPanel::new(ui.edit_panel, ui.edit_form);
        let prefill = PrefillHandler::new(edit_panel, |event: &RowEvent| {
            let available = event.snapshot["availability"].as_bool().unwrap_or(false);
            form_values(vec![
                ("id", FieldValue::text(event.entity_id.to_string())),
                ("destination_id", FieldValue::text(event.text("destination_id"))),
                ("name", FieldValue::text(event.text("name"))),
                ("capacity", FieldValue::text(event.text("capacity"))),
                ("price", FieldValue::text(event.text("price"))),
                ("availability", FieldValue::Checked(available)),
            ])
        });
        let delete = DeleteHandler::new(
            ENDPOINT,
            "Delete venue?",
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
