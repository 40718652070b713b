//! Service layer for the maintenance tracker.
//! - Talks to the resource store through the `client` traits.
//! - Keeps per-user state in an injectable `session::SessionContext`.
//! - Everything that shapes records for display is a pure function of the list.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod client;
pub mod session;
pub mod auth;
pub mod dashboard;
pub mod pagination;
pub mod records;
pub mod profile;
pub mod navigation;

pub use errors::ServiceError;
