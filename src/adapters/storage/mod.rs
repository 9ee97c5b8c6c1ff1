//! Object storage integration for the upload handoff

pub mod store;
pub mod traits;

pub use store::ObjectStoreUploader;
pub use traits::{ObjectUploader, UploadReceipt};
