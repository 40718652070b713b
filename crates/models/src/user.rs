use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::id;

/// Identity record as kept by the `users` collection.
///
/// Passwords are stored and compared in plaintext; the store is a
/// development fixture, not an identity provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id::string_or_number")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Create input: the id is optional and assigned by the store when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "id::opt_string_or_number")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    pub fn from_input(id: String, input: UserInput) -> Self {
        Self { id, name: input.name, email: input.email, password: input.password }
    }

    /// Exact, case-sensitive credential match.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

impl UserInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ModelError::Validation("password required".into()));
        }
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> UserInput {
        UserInput { id: None, name: "Dana".into(), email: "dana@example.com".into(), password: "hunter22".into() }
    }

    #[test]
    fn validate_rejects_missing_fields() {
        assert!(input().validate().is_ok());
        assert!(UserInput { email: "nope".into(), ..input() }.validate().is_err());
        assert!(UserInput { name: "  ".into(), ..input() }.validate().is_err());
        assert!(UserInput { password: String::new(), ..input() }.validate().is_err());
    }

    #[test]
    fn matches_is_exact() {
        let u = User::from_input("9".into(), input());
        assert!(u.matches("dana@example.com", "hunter22"));
        assert!(!u.matches("Dana@example.com", "hunter22"));
        assert!(!u.matches("dana@example.com", "hunter2"));
    }

    #[test]
    fn numeric_id_on_the_wire() {
        let u: User = serde_json::from_str(r#"{"id":731,"name":"a","email":"a@b","password":"x"}"#).unwrap();
        assert_eq!(u.id, "731");
        let json = serde_json::to_value(&input()).unwrap();
        assert!(json.get("id").is_none());
    }
}
