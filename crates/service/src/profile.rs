//! Profile editing and the "who is signed in" display derived from it.

use serde::Serialize;
use tracing::{debug, instrument};

use models::profile::email_local_part;
use models::Profile;

use crate::session::watch::IdentitySnapshot;
use crate::session::{SessionContext, SessionError};

const FALLBACK_NAME: &str = "User";

/// Name, email and avatar initial shown for the current user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub initial: String,
}

impl Identity {
    pub fn from_snapshot(snap: &IdentitySnapshot) -> Self {
        let cached = snap.email.clone().filter(|e| !e.is_empty());
        let (name, email) = match &snap.profile {
            Some(p) => {
                let email = Some(p.email.clone()).filter(|e| !e.is_empty()).or(cached);
                let name = if p.name.trim().is_empty() {
                    local_name(email.as_deref())
                } else {
                    p.name.clone()
                };
                (name, email.unwrap_or_default())
            }
            None => (local_name(cached.as_deref()), cached.unwrap_or_default()),
        };
        let initial = name.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default();
        Self { name, email, initial }
    }
}

fn local_name(email: Option<&str>) -> String {
    email_local_part(email.unwrap_or(FALLBACK_NAME)).unwrap_or(FALLBACK_NAME).to_string()
}

pub struct ProfileEditor {
    session: SessionContext,
}

impl ProfileEditor {
    pub fn new(session: SessionContext) -> Self { Self { session } }

    /// The saved profile, or one derived from the cached email.
    pub async fn load(&self) -> Result<Profile, SessionError> {
        if let Some(saved) = self.session.cached_profile().await? {
            return Ok(saved);
        }
        let email = self.session.identity().await?.email.unwrap_or_default();
        debug!("no saved profile; deriving from cached email");
        Ok(Profile::derived_from_email(&email))
    }

    /// Persist the profile and notify identity followers.
    #[instrument(skip(self, profile), fields(name = %profile.name))]
    pub async fn save(&self, profile: &Profile) -> Result<(), SessionError> {
        self.session.store_profile(profile).await
    }

    pub async fn display_identity(&self) -> Result<Identity, SessionError> {
        Ok(Identity::from_snapshot(&self.session.snapshot().await?))
    }
}
