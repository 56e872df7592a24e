use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value == "admin" {
            Role::Admin
        } else {
            Role::Other(value)
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl User {
    /// Admin accounts cannot be deleted from the user list.
    pub fn is_protected(&self) -> bool {
        self.role == Role::Admin
    }
}
