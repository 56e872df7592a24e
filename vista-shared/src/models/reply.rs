use serde::{Deserialize, Serialize};

/// Shape of every mutating response: `{message}` on success, `{error}` on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiReply {
    /// Lenient view over an arbitrary body; non-object bodies yield an empty reply.
    pub fn from_value(body: &serde_json::Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_from_value() {
        let ok = ApiReply::from_value(&json!({"message": "Destination created"}));
        assert_eq!(ok.message.as_deref(), Some("Destination created"));

        let err = ApiReply::from_value(&json!({"error": "Missing name or description"}));
        assert_eq!(err.error.as_deref(), Some("Missing name or description"));

        assert_eq!(ApiReply::from_value(&json!([1, 2])), ApiReply::default());
    }
}
