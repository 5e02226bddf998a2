pub mod attachments;
pub mod persistence;
pub mod record_store;

pub use attachments::AttachmentStore;
pub use persistence::{JsonFileStorage, SnapshotStorage};
pub use record_store::RecordStore;
