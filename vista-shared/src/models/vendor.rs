use serde::{Deserialize, Serialize};

use crate::pii::Masked;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub vendor_id: i64,
    pub name: String,
    pub service_type: String,
    pub price_range: String,
    pub contact: Masked<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorPayload {
    pub name: String,
    pub service_type: String,
    pub price_range: String,
    pub contact: Masked<String>,
}
