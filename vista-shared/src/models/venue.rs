use serde::{Deserialize, Serialize};

/// A venue scoped to a destination.
///
/// `destination_name` is only filled on the unfiltered listing, where the
/// backend joins the destination table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub destination_id: i64,
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "super::default_available", deserialize_with = "super::flexible_bool")]
    pub availability: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenuePayload {
    pub destination_id: i64,
    pub name: String,
    pub capacity: i64,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_venue_has_no_destination_name() {
        let json = r#"{"id": 7, "name": "Hall", "destination_id": 2,
                       "capacity": 120, "price": 99.5, "availability": 1}"#;
        let venue: Venue = serde_json::from_str(json).unwrap();
        assert_eq!(venue.destination_name, None);
        assert!(venue.availability);
        assert_eq!(venue.price, 99.5);
    }
}
