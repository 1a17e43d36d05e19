pub mod pandoc_client;
pub mod record_store_client;

pub use pandoc_client::{DocumentRenderer, PandocClient};
pub use record_store_client::{InsertOutcome, RecordStore, RecordStoreClient};
