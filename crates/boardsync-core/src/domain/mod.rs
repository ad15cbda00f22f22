//! Domain model: items, catalogs, mutations and the error taxonomy.

pub mod catalog;
pub mod error;
pub mod item;
pub mod mutation;

pub use catalog::{
    FieldDefinition, FieldKind, FieldOptions, IterationOption, ProjectCatalog, SingleSelectOption,
};
pub use error::{
    BatchError, FetchError, MutationError, NotificationError, Result, SyncError, TransportError,
};
pub use item::{Assignee, FieldValue, IssueContent, Item, ItemId, ItemState};
pub use mutation::{FieldChange, MutationRequest};
