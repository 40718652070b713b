use std::sync::Arc;

use tracing::{debug, info, instrument};

use models::UserInput;

use crate::client::UsersApi;
use crate::session::SessionContext;

use super::domain::{LoginInput, RegisterInput, SessionUser, MIN_PASSWORD_LEN};
use super::errors::AuthError;

/// Sign-in, registration and sign-out against a user directory.
pub struct AuthService {
    users: Arc<dyn UsersApi>,
    session: SessionContext,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersApi>, session: SessionContext) -> Self { Self { users, session } }

    pub fn session(&self) -> &SessionContext { &self.session }

    /// Match the credentials against the directory and mark the session signed in.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{AuthService, LoginInput};
    /// use service::client::InMemoryResources;
    /// use service::session::SessionContext;
    /// let svc = AuthService::new(Arc::new(InMemoryResources::seeded()), SessionContext::in_memory());
    /// let input = LoginInput { email: "admin@example.com".into(), password: "password".into() };
    /// let user = tokio_test::block_on(svc.login(input)).unwrap();
    /// assert_eq!(user.name, "Admin User");
    /// assert!(tokio_test::block_on(svc.session().is_authenticated()).unwrap());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<SessionUser, AuthError> {
        if input.email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("Please fill in all fields".into()));
        }
        let users = self.users.list_users().await?;
        let user = users
            .iter()
            .find(|u| u.matches(&input.email, &input.password))
            .ok_or(AuthError::Unauthorized)?;

        self.session.sign_in(user).await?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(SessionUser::from(user))
    }

    /// Create an account and sign it in.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{AuthService, RegisterInput};
    /// use service::client::InMemoryResources;
    /// use service::session::SessionContext;
    /// let svc = AuthService::new(Arc::new(InMemoryResources::seeded()), SessionContext::in_memory());
    /// let input = RegisterInput {
    ///     name: "Dana".into(),
    ///     email: "dana@example.com".into(),
    ///     password: "hunter22".into(),
    ///     confirm_password: "hunter22".into(),
    /// };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "dana@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<SessionUser, AuthError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_string();
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("Please fill in all fields".into()));
        }
        if input.password != input.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".into()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        models::user::validate_email(&email).map_err(|e| AuthError::Validation(e.to_string()))?;

        if !self.users.find_users_by_email(&email).await?.is_empty() {
            debug!("user exists: {email}");
            return Err(AuthError::Conflict);
        }

        let created = self
            .users
            .create_user(&UserInput { id: None, name, email, password: input.password })
            .await?;
        self.session.sign_in(&created).await?;
        info!(user_id = %created.id, email = %created.email, "user_registered");
        Ok(SessionUser::from(&created))
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.session.sign_out().await?;
        Ok(())
    }

    /// The signed-in user, if any.
    pub async fn current(&self) -> Result<Option<SessionUser>, AuthError> {
        if !self.session.is_authenticated().await? {
            return Ok(None);
        }
        let id = self.session.identity().await?;
        Ok(Some(SessionUser {
            id: id.id.unwrap_or_default(),
            name: id.name.unwrap_or_default(),
            email: id.email.unwrap_or_default(),
        }))
    }
}
