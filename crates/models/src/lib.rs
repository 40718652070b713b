//! Domain data types shared by the resource store, the resource client and
//! the service layer. Wire names are camelCase to match the JSON store.

pub mod errors;
pub mod id;
pub mod user;
pub mod part;
pub mod record;
pub mod profile;
pub mod seed;

pub use errors::ModelError;
pub use part::{Part, Replaced, PART_TYPES};
pub use profile::Profile;
pub use record::{Record, RecordInput};
pub use user::{User, UserInput};
