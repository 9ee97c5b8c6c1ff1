//! Export progress tracking with checkpoint sidecars

pub mod checkpoint;
pub mod store;

pub use checkpoint::{Checkpoint, CheckpointStatus};
pub use store::CheckpointStore;
