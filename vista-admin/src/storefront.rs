//! Public index page: destination cards and the booking request form.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;
use vista_core::markup::escape;
use vista_core::surface::{repopulate, SelectOption};
use vista_core::{
    fetch_json, ActionDispatcher, ActionKind, ActionOutcome, ApiRequest, Container, CoreError,
    CoreResult, EditPanel, Field, FieldKind, FieldValue, FormSchema, FormSubmitter, FormSurface,
    Level, ListView, Lister, Method, Notifier, Panel, Refresh, RefreshOutcome, RestTransport, Row,
    RowAction, RowEvent, RowHandler, Select, Trigger,
};
use vista_shared::{BookingRequest, Destination, Venue};

use crate::{destinations, form_values, snapshot, venues, AdminState};

pub struct StorefrontUi {
    pub destinations: Arc<dyn Container>,
    pub booking_form: Arc<dyn FormSurface>,
    pub booking_panel: Arc<dyn Panel>,
    /// The booking form's venue field.
    pub venue_select: Arc<dyn Select>,
}

struct StorefrontCards;

impl ListView<Destination> for StorefrontCards {
    fn row(&self, d: &Destination) -> Row {
        let (action, triggers) = if d.availability {
            let event = RowEvent::new(RowAction::Select, d.id, snapshot(d));
            let book = Trigger::new("destination", "Book", event).class("btn-book");
            (book.button(), vec![book])
        } else {
            ("<span class=\"badge\">Unavailable</span>".to_string(), Vec::new())
        };

        let html = format!(
            "<div class=\"destination-card\"><h3>{}</h3><p>{}</p>{}</div>",
            escape(&d.name),
            escape(&d.description),
            action,
        );
        Row::new(html, triggers)
    }

    fn empty(&self) -> Row {
        Row::placeholder("<p class=\"empty-state\">No destinations available</p>".to_string())
    }

    fn failure(&self, _error: &CoreError) -> Row {
        Row::placeholder("<p class=\"error-state\">Error loading destinations</p>".to_string())
    }
}

/// "Book": load the destination's bookable venues into the venue select and
/// open the booking form for that destination.
struct BookHandler {
    transport: Arc<dyn RestTransport>,
    panel: EditPanel,
    venue_select: Arc<dyn Select>,
    notifier: Arc<dyn Notifier>,
}

impl BookHandler {
    async fn venues(&self, destination_id: i64) -> CoreResult<Vec<Venue>> {
        let request = ApiRequest::get(venues::ENDPOINT)
            .with_query("destination_id", destination_id.to_string());
        fetch_json(self.transport.as_ref(), request).await
    }
}

#[async_trait]
impl RowHandler for BookHandler {
    async fn handle(&self, event: &RowEvent) -> ActionOutcome {
        let venues = match self.venues(event.entity_id).await {
            Ok(venues) => venues,
            Err(err) => {
                error!("Error loading venues for destination {}: {}", event.entity_id, err);
                self.notifier.notify(Level::Danger, &format!("Error loading venues: {}", err));
                return ActionOutcome::Missing(err.to_string());
            }
        };

        // Start from a fresh list rather than keeping the previous destination's venues.
        self.venue_select.set_options(Vec::new());
        let options = venues
            .iter()
            .filter(|v| v.availability)
            .map(|v| {
                let label = format!("{} (up to {} guests, ${})", v.name, v.capacity, v.price);
                SelectOption::new(v.id.to_string(), label)
            })
            .collect();
        repopulate(self.venue_select.as_ref(), "Select Venue", options);

        self.panel.open(form_values(vec![(
            "destination_id",
            FieldValue::text(event.entity_id.to_string()),
        )]));
        ActionOutcome::Opened
    }
}

fn booking_schema() -> FormSchema {
    FormSchema::new(vec![
        Field::new("destination_id", FieldKind::Integer).required(),
        Field::new("venue_id", FieldKind::Integer).required(),
        Field::new("customer_name", FieldKind::Text).required(),
        Field::new("customer_email", FieldKind::Email).required(),
        Field::new("booking_date", FieldKind::Date).required(),
    ])
}

pub struct StorefrontScreen {
    pub lister: Arc<Lister<Destination>>,
    pub booking: FormSubmitter<BookingRequest>,
    pub actions: ActionDispatcher,
    list: Arc<dyn Container>,
}

impl StorefrontScreen {
    pub fn new(state: &AdminState, ui: StorefrontUi) -> Self {
        let lister = Arc::new(
            Lister::<Destination>::new(destinations::ENDPOINT, state.transport.clone())
                .target(ui.destinations.clone(), Arc::new(StorefrontCards)),
        );

        let booking = FormSubmitter::<BookingRequest>::new(
            booking_schema(),
            Method::Post,
            "/api/bookings",
            state.transport.clone(),
            ui.booking_form.clone(),
            state.notifier.clone(),
        )
        .closes(ui.booking_panel.clone())
        .refreshes(lister.clone());

        let book = BookHandler {
            transport: state.transport.clone(),
            panel: EditPanel::new(ui.booking_panel, ui.booking_form),
            venue_select: ui.venue_select,
            notifier: state.notifier.clone(),
        };
        let actions = ActionDispatcher::new(lister.clone()).on(ActionKind::Select, Arc::new(book));

        Self {
            lister,
            booking,
            actions,
            list: ui.destinations,
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
