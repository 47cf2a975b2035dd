//! Destinations for dispatch log records.
//!
//! # Design
//! The dispatcher is handed a `LogSink` at construction instead of reaching
//! for a process-wide logger. `TracingSink` forwards to `tracing` for normal
//! runs; `MemorySink` keeps records so scenarios can assert on them.

use std::sync::{Mutex, PoisonError};

use crate::error::LogError;

pub const DISPATCH_TARGET: &str = "dispatch_core::dispatch";

pub trait LogSink: Send + Sync {
    fn emit(&self, record: &str) -> Result<(), LogError>;
}

/// Emits each record as a `DEBUG` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &str) -> Result<(), LogError> {
        tracing::debug!(target: DISPATCH_TARGET, "{record}");
        Ok(())
    }
}

/// Keeps every record in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &str) -> Result<(), LogError> {
        self.records
            .lock()
            .map_err(|e| LogError(e.to_string()))?
            .push(record.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.emit("first").unwrap();
        sink.emit("second").unwrap();
        assert_eq!(sink.records(), vec!["first", "second"]);

        sink.clear();
        assert!(sink.records().is_empty());
    }

    #[traced_test]
    #[test]
    fn tracing_sink_emits_debug_event() {
        TracingSink.emit("Request: GET /health").unwrap();
        assert!(logs_contain("Request: GET /health"));
    }
}
