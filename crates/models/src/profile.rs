use serde::{Deserialize, Serialize};

/// Company shown on a freshly derived profile.
pub const DEFAULT_COMPANY: &str = "Super Wheels Car Maintenance";

/// Locally cached user profile. Not persisted by the resource store.
///
/// Unknown fields (such as the retired `position`) are ignored on read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
}

impl Profile {
    /// Profile derived from a cached email when nothing has been saved yet.
    pub fn derived_from_email(email: &str) -> Self {
        Self {
            name: email_local_part(email).unwrap_or("User").to_string(),
            email: email.to_string(),
            phone: String::new(),
            company: DEFAULT_COMPANY.to_string(),
        }
    }
}

/// Text before the first `@`, or `None` when that would be empty.
pub fn email_local_part(email: &str) -> Option<&str> {
    let local = email.split('@').next().unwrap_or_default();
    if local.is_empty() { None } else { Some(local) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_position_is_dropped() {
        let p: Profile = serde_json::from_str(
            r#"{"name":"Ann","email":"ann@x.io","phone":"1","company":"C","position":"Lead"}"#,
        )
        .unwrap();
        assert_eq!(p.name, "Ann");
        let back = serde_json::to_value(&p).unwrap();
        assert!(back.get("position").is_none());
    }

    #[test]
    fn derived_profile_uses_local_part() {
        let p = Profile::derived_from_email("tj@example.com");
        assert_eq!(p.name, "tj");
        assert_eq!(p.company, DEFAULT_COMPANY);
        assert_eq!(Profile::derived_from_email("").name, "User");
        assert_eq!(Profile::derived_from_email("@host").name, "User");
    }
}
