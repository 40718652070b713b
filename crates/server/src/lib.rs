//! Mock REST resource store: `records` and `users` collections kept as JSON
//! files, served the way a json-server style fixture would.

pub mod errors;
pub mod openapi;
pub mod records;
pub mod routes;
pub mod startup;
pub mod users;

pub use routes::{build_router, ServerState};
pub use startup::run;
