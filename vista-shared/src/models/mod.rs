pub mod booking;
pub mod destination;
pub mod reply;
pub mod user;
pub mod vendor;
pub mod venue;

pub use booking::{Booking, BookingRequest, BookingStatus, StatusUpdate};
pub use destination::{Destination, DestinationPayload};
pub use reply::ApiReply;
pub use user::{Role, User};
pub use vendor::{Vendor, VendorPayload};
pub use venue::{Venue, VenuePayload};

use serde::{Deserialize, Deserializer};

/// SQLite-backed endpoints hand out booleans as `0`/`1`.
pub(crate) fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

fn default_available() -> bool {
    true
}
