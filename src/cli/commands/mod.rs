//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod export;
pub mod handle_event;
pub mod init;
pub mod status;
pub mod validate;
