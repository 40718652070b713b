//! Auth module: domain inputs, errors, the sign-in service and the route gate.
//!
//! Credentials are checked against the user directory in plaintext; the
//! outcome is recorded in the [`SessionContext`](crate::session::SessionContext).

pub mod domain;
pub mod errors;
pub mod gate;
pub mod service;

pub use domain::{LoginInput, RegisterInput, SessionUser};
pub use errors::AuthError;
pub use gate::{resolve, settle, Access, Route};
pub use service::AuthService;
