use serde::Serialize;
use serde_json::Value;
use vista_core::{FieldValue, FormValues};

pub mod bookings;
pub mod console;
pub mod destinations;
pub mod error;
pub mod page;
pub mod state;
pub mod storefront;
pub mod users;
pub mod vendors;
pub mod venues;

pub use error::AdminError;
pub use page::MemoryPage;
pub use state::AdminState;

/// Record as carried in a trigger's event.
pub(crate) fn snapshot<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_default()
}

pub(crate) fn form_values(pairs: Vec<(&str, FieldValue)>) -> FormValues {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
