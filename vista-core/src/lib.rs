pub mod actions;
pub mod form;
pub mod guard;
pub mod lister;
pub mod markup;
pub mod surface;
pub mod testing;
pub mod toggle;
pub mod transport;

pub use actions::{
    ActionDispatcher, ActionKind, ActionOutcome, DeleteHandler, PrefillHandler, RowHandler,
    StatusHandler,
};
pub use form::{
    Feedback, Field, FieldKind, FormSchema, FormSubmitter, SubmitOutcome, SuccessRule,
};
pub use guard::{InFlightGuard, InFlightPermit};
pub use lister::{fetch_json, ListView, Lister, Refresh, RefreshOutcome};
pub use markup::{Fragment, Row, RowAction, RowEvent, Trigger};
pub use surface::{
    Confirmer, Container, FieldValue, FilterSource, FormSurface, FormValues, Level, Notifier, Panel,
    Select, SelectFilter, SelectOption,
};
pub use toggle::EditPanel;
pub use transport::{ApiRequest, ApiResponse, Body, FormPart, Method, RestTransport};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
