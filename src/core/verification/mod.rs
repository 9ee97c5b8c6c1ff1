//! Post-export verification of output files
//!
//! - [`checksum`] - SHA-256 of exported files
//! - [`verify`] - Line-by-line structural check against the written count

pub mod checksum;
pub mod report;
pub mod verify;

pub use report::{VerificationFailure, VerificationReport};
pub use verify::verify_output;
