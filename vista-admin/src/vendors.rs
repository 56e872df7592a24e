//! The vendor-management module. It talks to its own backend, judges success
//! by HTTP status and reports through inline alerts.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;
use vista_core::markup::escape;
use vista_core::{
    ActionDispatcher, ActionKind, ActionOutcome, Container, CoreError, DeleteHandler, EditPanel,
    Feedback, Field, FieldKind, FieldValue, FormSchema, FormSubmitter, FormSurface, Level, ListView,
    Lister, Method, Notifier, Panel, Refresh, RefreshOutcome, Row, RowAction, RowEvent, RowHandler,
    SuccessRule, Trigger,
};
use vista_shared::{Vendor, VendorPayload};

use crate::{form_values, snapshot, AdminState};

pub struct VendorsUi {
    pub table: Arc<dyn Container>,
    pub add_form: Arc<dyn FormSurface>,
    pub edit_form: Arc<dyn FormSurface>,
    pub edit_modal: Arc<dyn Panel>,
}

struct VendorRows;

impl ListView<Vendor> for VendorRows {
    fn row(&self, v: &Vendor) -> Row {
        let data = snapshot(v);
        let edit = RowEvent::new(RowAction::Edit, v.vendor_id, data.clone());
        let edit = Trigger::new("vendor", "Edit", edit).class("btn btn-sm btn-warning");
        let delete = RowEvent::new(RowAction::Delete, v.vendor_id, data);
        let delete = Trigger::new("vendor", "Delete", delete).class("btn btn-sm btn-danger");

        let html = format!(
            "<tr><td>{}</td><td>{}</td><td><span class=\"badge bg-info\">{}</span></td><td>{}</td><td>{}</td><td>{}{}</td></tr>",
            v.vendor_id,
            escape(&v.name),
            escape(&v.service_type),
            escape(&v.price_range),
            escape(v.contact.expose()),
            edit.button(),
            delete.button(),
        );
        Row::new(html, vec![edit, delete])
    }

    fn empty(&self) -> Row {
        Row::placeholder(
            "<tr><td colspan=\"6\" class=\"text-center text-muted\">No vendors found. Add your first vendor above!</td></tr>"
                .to_string(),
        )
    }

    fn failure(&self, _error: &CoreError) -> Row {
        Row::placeholder(
            "<tr><td colspan=\"6\" class=\"text-center text-danger\">Error loading vendors</td></tr>"
                .to_string(),
        )
    }
}

/// Re-fetches the collection and pre-fills the modal from the matching vendor,
/// so the modal never shows a stale row.
struct VendorEditHandler {
    lister: Arc<Lister<Vendor>>,
    modal: EditPanel,
    notifier: Arc<dyn Notifier>,
}

#[async_trait]
impl RowHandler for VendorEditHandler {
    async fn handle(&self, event: &RowEvent) -> ActionOutcome {
        let vendors = match self.lister.fetch().await {
            Ok(vendors) => vendors,
            Err(err) => {
                error!("Error loading vendor for edit: {}", err);
                self.notifier.notify(Level::Danger, "Error loading vendor details");
                return ActionOutcome::Missing(err.to_string());
            }
        };

        let Some(vendor) = vendors.into_iter().find(|v| v.vendor_id == event.entity_id) else {
            self.notifier.notify(Level::Danger, "Vendor not found");
            return ActionOutcome::Missing(format!("vendor {}", event.entity_id));
        };

        self.modal.open(form_values(vec![
            ("vendor_id", FieldValue::text(vendor.vendor_id.to_string())),
            ("name", FieldValue::text(vendor.name)),
            ("service_type", FieldValue::text(vendor.service_type)),
            ("price_range", FieldValue::text(vendor.price_range)),
            ("contact", FieldValue::text(vendor.contact.into_inner())),
        ]));
        ActionOutcome::Opened
    }
}

fn schema(with_id: bool) -> FormSchema {
    let mut fields = Vec::new();
    if with_id {
        fields.push(Field::new("vendor_id", FieldKind::Hidden).required());
    }
    fields.extend([
        Field::new("name", FieldKind::Text).required(),
        Field::new("service_type", FieldKind::Select).required(),
        Field::new("price_range", FieldKind::Text).required(),
        Field::new("contact", FieldKind::Text).required(),
    ]);
    FormSchema::new(fields)
}

pub struct VendorsScreen {
    pub lister: Arc<Lister<Vendor>>,
    pub add: FormSubmitter<VendorPayload>,
    pub edit: FormSubmitter<VendorPayload>,
    pub actions: ActionDispatcher,
    table: Arc<dyn Container>,
}

impl VendorsScreen {
    pub fn new(state: &AdminState, ui: VendorsUi) -> Self {
        let base = state.vendor_base_url.trim_end_matches('/').to_string();
        let lister = Arc::new(
            Lister::<Vendor>::new(base.clone(), state.transport.clone())
                .target(ui.table.clone(), Arc::new(VendorRows))
                .alert_failures(state.notifier.clone(), "Error loading vendors: "),
        );

        let add = FormSubmitter::<VendorPayload>::new(
            schema(false),
            Method::Post,
            &base,
            state.transport.clone(),
            ui.add_form,
            state.notifier.clone(),
        )
        .success_rule(SuccessRule::HttpOk)
        .feedback(
            Feedback::new("Vendor added successfully!")
                .on_failure("Error adding vendor: ", "Failed to add vendor"),
        )
        .refreshes(lister.clone());

        let edit = FormSubmitter::<VendorPayload>::new(
            schema(true),
            Method::Put,
            &format!("{}/{{vendor_id}}", base),
            state.transport.clone(),
            ui.edit_form.clone(),
            state.notifier.clone(),
        )
        .success_rule(SuccessRule::HttpOk)
        .feedback(
            Feedback::new("Vendor updated successfully!")
                .on_failure("Error updating vendor: ", "Failed to update vendor"),
        )
        .closes(ui.edit_modal.clone())
        .refreshes(lister.clone());

        let edit_handler = VendorEditHandler {
            lister: lister.clone(),
            modal: EditPanel::new(ui.edit_modal, ui.edit_form),
            notifier: state.notifier.clone(),
        };
        let delete = DeleteHandler::new(
            &base,
            "Are you sure you want to delete this vendor?",
            state.transport.clone(),
            state.confirmer.clone(),
            state.notifier.clone(),
        )
        .announce(
            SuccessRule::HttpOk,
            Feedback::new("Vendor deleted successfully!")
                .on_failure("Error deleting vendor: ", "Failed to delete vendor"),
        );
        let actions = ActionDispatcher::new(lister.clone())
            .on(ActionKind::Edit, Arc::new(edit_handler))
            .on(ActionKind::Delete, Arc::new(delete));

        Self {
            lister,
            add,
            edit,
            actions,
            table: ui.table,
        }
    }

    pub async fn load(&self) -> RefreshOutcome {
        self.lister.refresh().await
    }

    pub async fn activate(&self, key: &str) -> Option<ActionOutcome> {
        self.actions.activate(self.table.as_ref(), key).await
    }

    pub fn html(&self) -> String {
        self.table.html()
    }
}
