//! Records: the browse pipeline, the entry builder and the list service.

pub mod entry;
pub mod query;
pub mod service;

pub use entry::{Field, FieldErrors, PartDraft, RecordEntryBuilder, SubmitError};
pub use query::{plate_options, CostFilter, PlateFilter, RecordBrowser, RecordPage, RecordQuery, SortOrder, StatusFilter};
pub use service::{RecordsService, RecordsView};
