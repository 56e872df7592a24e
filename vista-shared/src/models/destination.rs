use serde::{Deserialize, Serialize};

/// A bookable place, as listed by `/api/destinations`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "super::default_available", deserialize_with = "super::flexible_bool")]
    pub availability: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Destination {
    pub fn availability_label(&self) -> &'static str {
        if self.availability {
            "Available"
        } else {
            "Unavailable"
        }
    }
}

/// Body of `POST /api/destinations` and `PUT /api/destinations/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DestinationPayload {
    pub name: String,
    pub description: String,
    pub availability: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
