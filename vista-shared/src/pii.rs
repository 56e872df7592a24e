use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Customer contact data that must not leak through `Debug` output.
///
/// Serialization is transparent: the backend needs the real value. Only the
/// formatting used by log macros is masked, keeping the first character and
/// the mail domain when there is one (`j*****@example.com`).
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> Masked<T> {
    fn masked(&self) -> String {
        let raw = self.0.to_string();
        let (local, domain) = match raw.split_once('@') {
            Some((local, domain)) => (local.to_string(), Some(domain.to_string())),
            None => (raw, None),
        };

        let mut out = String::new();
        let mut chars = local.chars();
        if let Some(first) = chars.next() {
            out.push(first);
        }
        out.extend(chars.map(|_| '*'));

        if let Some(domain) = domain {
            out.push('@');
            out.push_str(&domain);
        }
        out
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }

    /// The unmasked value, for rendering into markup the user owns.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_email_local_part() {
        let email = Masked("jane@example.com".to_string());
        assert_eq!(format!("{:?}", email), "j***@example.com");
        assert_eq!(email.expose(), "jane@example.com");
    }

    #[test]
    fn test_serialize_is_transparent() {
        let phone = Masked("555-0100".to_string());
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"555-0100\"");
        assert_eq!(format!("{:?}", phone), "5*******");
    }
}
