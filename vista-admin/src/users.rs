use std::sync::Arc;
use vista_core::markup::escape;
use vista_core::{
    ActionDispatcher, ActionKind, ActionOutcome, Container, CoreError, DeleteHandler, ListView,
    Lister, Refresh, RefreshOutcome, Row, RowAction, RowEvent, Trigger,
};
use vista_shared::User;

use crate::{snapshot, AdminState};

pub const ENDPOINT: &str = "/api/users";

struct UserRows;

impl ListView<User> for UserRows {
    fn row(&self, u: &User) -> Row {
        let event = RowEvent::new(RowAction::Delete, u.id, snapshot(u));
        let delete = Trigger::new("user", "Delete", event)
            .class("btn-danger")
            .enabled(!u.is_protected());

        let html = format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            u.id,
            escape(&u.username),
            escape(u.role.as_str()),
            delete.button(),
        );
        Row::new(html, vec![delete])
    }

    fn empty(&self) -> Row {
        Row::placeholder("<tr><td colspan=\"4\">No users found</td></tr>".to_string())
    }

    fn failure(&self, _error: &CoreError) -> Row {
        Row::placeholder(
            "<tr><td colspan=\"4\" class=\"text-danger\">Error loading users</td></tr>".to_string(),
        )
    }
}

pub struct UsersScreen {
    pub lister: Arc<Lister<User>>,
    pub actions: ActionDispatcher,
    list: Arc<dyn Container>,
}

impl UsersScreen {
    pub fn new(state: &AdminState, list: Arc<dyn Container>) -> Self {
        let lister = Arc::new(
            Lister::<User>::new(ENDPOINT, state.transport.clone())
                .target(list.clone(), Arc::new(UserRows)),
        );

        let delete = DeleteHandler::new(
            ENDPOINT,
            "Delete this user?",
            state.transport.clone(),
            state.confirmer.clone(),
            state.notifier.clone(),
        );
        let actions =
            ActionDispatcher::new(lister.clone()).on(ActionKind::Delete, Arc::new(delete));

        Self { lister, actions, list }
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
