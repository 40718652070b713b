use thiserror::Error;

use crate::client::ClientError;
use crate::session::SessionError;

/// Business errors for auth workflows. Messages are shown to the user as is.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("User with this email already exists")]
    Conflict,
    #[error("Invalid email or password")]
    Unauthorized,
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("user directory unavailable: {0}")]
    Directory(#[from] ClientError),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::Unauthorized => 1004,
            AuthError::Session(_) => 1100,
            AuthError::Directory(_) => 1200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::Validation("x".into()).code(), 1001);
        assert_eq!(AuthError::Unauthorized.code(), 1004);
        assert_eq!(AuthError::Unauthorized.to_string(), "Invalid email or password");
        let net = AuthError::from(ClientError::Network("refused".into()));
        assert_eq!(net.code(), 1200);
    }
}
