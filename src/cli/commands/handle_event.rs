//! Handle-event command implementation
//!
//! Runs one export from a JSON event and prints the status-coded response
//! document on stdout, so the binary can sit behind any event-driven runtime.

use crate::config::load_config_or_env;
use crate::core::event::{handle_event_with_config, EventResponse, ExportEvent};
use clap::Args;
use std::io::Read;

/// Arguments for the handle-event command
#[derive(Args, Debug)]
pub struct HandleEventArgs {
    /// Event JSON (read from stdin when omitted)
    pub event: Option<String>,
}

impl HandleEventArgs {
    fn read_event(&self) -> anyhow::Result<ExportEvent> {
        let raw = match &self.event {
            Some(raw) => raw.clone(),
            None => {
                let mut raw = String::new();
                std::io::stdin().read_to_string(&mut raw)?;
                raw
            }
        };

        if raw.trim().is_empty() {
            return Ok(ExportEvent::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Execute the handle-event command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let response = match self.read_event() {
            Ok(event) => match load_config_or_env(config_path) {
                Ok(config) => handle_event_with_config(event, &config).await,
                Err(e) => {
                    tracing::error!(error = %e, "Configuration loading failed");
                    EventResponse::error(500, e.to_string())
                }
            },
            Err(e) => EventResponse::error(400, format!("Error: invalid event: {e}")),
        };

        println!("{}", serde_json::to_string(&response)?);
        Ok(if response.is_success() { 0 } else { 1 })
    }
}
