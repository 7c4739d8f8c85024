//! Session model definitions

use serde::{Deserialize, Serialize};

/// Profile of the authenticated user, as returned by the profile endpoint
///
/// Fields the client doesn't use are kept in `extra` so the stored copy is
/// the same document the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "nombre_completo", default)]
    pub full_name: String,
    #[serde(rename = "rol", default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(rename = "permisos", default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Create a profile with the given username
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: String::new(),
            full_name: String::new(),
            role: String::new(),
            is_active: None,
            permissions: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Set the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Set the full name
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Set the role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// The client-held {token, user profile} pair of an authenticated user
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let raw = json!({
            "id": 1,
            "username": "admin",
            "email": "admin@coop.test",
            "nombre_completo": "Administrador",
            "rol": "admin",
            "is_active": true,
            "permisos": ["asociados:leer"],
            "last_login": "2024-01-01T00:00:00"
        });

        let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(profile.full_name, "Administrador");
        assert_eq!(profile.role, "admin");
        assert_eq!(profile.permissions, vec!["asociados:leer".to_string()]);
        assert!(profile.extra.contains_key("last_login"));

        assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let profile = UserProfile::new("ana");
        assert_eq!(profile.display_name(), "ana");

        let profile = profile.with_full_name("Ana Ruiz");
        assert_eq!(profile.display_name(), "Ana Ruiz");
    }
}
