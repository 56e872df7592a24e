use std::sync::Arc;
use vista_core::markup::escape;
use vista_core::{
    ActionDispatcher, ActionKind, ActionOutcome, Container, CoreError, DeleteHandler, ListView,
    Lister, Refresh, RefreshOutcome, Row, RowAction, RowEvent, StatusHandler, Trigger,
};
use vista_shared::{Booking, BookingStatus, StatusUpdate};

use crate::{snapshot, AdminState};

pub const ENDPOINT: &str = "/api/bookings";

pub struct BookingsUi {
    pub pending: Arc<dyn Container>,
    pub history: Arc<dyn Container>,
}

fn customer(b: &Booking) -> String {
    escape(b.customer_name.as_deref().unwrap_or(""))
}

fn venue(b: &Booking) -> String {
    escape(b.venue_name.as_deref().unwrap_or(""))
}

fn date(b: &Booking) -> String {
    b.booking_date.map(|d| d.to_string()).unwrap_or_default()
}

fn status_trigger(label: &str, status: BookingStatus, b: &Booking) -> Trigger {
    let action = RowAction::SetStatus(status.as_str().to_string());
    Trigger::new("booking", label, RowEvent::new(action, b.id, snapshot(b)))
}

/// Bookings awaiting a decision, with Confirm and Cancel.
struct PendingRows;

impl ListView<Booking> for PendingRows {
    fn includes(&self, b: &Booking) -> bool {
        b.status.is_pending()
    }

    fn row(&self, b: &Booking) -> Row {
        let confirm = status_trigger("Confirm", BookingStatus::Confirmed, b);
        let cancel = status_trigger("Cancel", BookingStatus::Cancelled, b).class("btn-danger");

        let contact = match &b.customer_email {
            Some(email) => format!("{} ({})", customer(b), escape(email.expose())),
            None => customer(b),
        };
        let html = format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}{}</td></tr>",
            b.id,
            contact,
            venue(b),
            date(b),
            confirm.button(),
            cancel.button(),
        );
        Row::new(html, vec![confirm, cancel])
    }

    fn empty(&self) -> Row {
        Row::placeholder("<tr><td colspan=\"5\">No pending bookings</td></tr>".to_string())
    }

    fn failure(&self, _error: &CoreError) -> Row {
        Row::placeholder(
            "<tr><td colspan=\"5\" class=\"text-danger\">Error loading bookings</td></tr>"
                .to_string(),
        )
    }

    fn loading(&self) -> Option<Row> {
        Some(Row::placeholder("<tr><td colspan=\"5\">Loading...</td></tr>".to_string()))
    }
}

/// Decided bookings with their status and a Delete control.
struct HistoryRows;

impl ListView<Booking> for HistoryRows {
    fn includes(&self, b: &Booking) -> bool {
        !b.status.is_pending()
    }

    fn row(&self, b: &Booking) -> Row {
        let event = RowEvent::new(RowAction::Delete, b.id, snapshot(b));
        let delete = Trigger::new("booking", "Delete", event).class("btn-danger");

        let html = format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            b.id,
            customer(b),
            venue(b),
            date(b),
            b.status,
            delete.button(),
        );
        Row::new(html, vec![delete])
    }

    fn empty(&self) -> Row {
        Row::placeholder("<tr><td colspan=\"6\">No past bookings</td></tr>".to_string())
    }

    fn failure(&self, _error: &CoreError) -> Row {
        Row::placeholder(
            "<tr><td colspan=\"6\" class=\"text-danger\">Error loading bookings</td></tr>"
                .to_string(),
        )
    }
}

pub struct BookingsScreen {
    pub lister: Arc<Lister<Booking>>,
    pub actions: ActionDispatcher,
    pending: Arc<dyn Container>,
    history: Arc<dyn Container>,
}

impl BookingsScreen {
    pub fn new(state: &AdminState, ui: BookingsUi) -> Self {
        let lister = Arc::new(
            Lister::<Booking>::new(ENDPOINT, state.transport.clone())
                .target(ui.pending.clone(), Arc::new(PendingRows))
                .target(ui.history.clone(), Arc::new(HistoryRows)),
        );

        let status = StatusHandler::new(
            ENDPOINT,
            state.transport.clone(),
            state.notifier.clone(),
            |slug: &str| {
                slug.parse::<BookingStatus>().map(|status| StatusUpdate { status })
            },
        );
        let delete = DeleteHandler::new(
            ENDPOINT,
            "Delete this booking?",
            state.transport.clone(),
            state.confirmer.clone(),
            state.notifier.clone(),
        );
        let actions = ActionDispatcher::new(lister.clone())
            .on(ActionKind::SetStatus, Arc::new(status))
            .on(ActionKind::Delete, Arc::new(delete));

        Self {
            lister,
            actions,
            pending: ui.pending,
            history: ui.history,
        }
    }

    pub async fn load(&self) -> RefreshOutcome {
        self.lister.refresh().await
    }

    /// Controls live in either table; look in both.
    pub async fn activate(&self, key: &str) -> Option<ActionOutcome> {
        match self.actions.activate(self.pending.as_ref(), key).await {
            Some(outcome) => Some(outcome),
            None => self.actions.activate(self.history.as_ref(), key).await,
        }
    }

    pub fn pending_html(&self) -> String {
        self.pending.html()
    }

    pub fn history_html(&self) -> String {
        self.history.html()
    }

    pub fn html(&self) -> String {
        format!(
            "<table id=\"pending\">\n{}\n</table>\n<table id=\"history\">\n{}\n</table>",
            self.pending_html(),
            self.history_html()
        )
    }
}
