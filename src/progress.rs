// Progress reporting for long flattening runs
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Observer notified as objects are processed.
///
/// Reporting is a side channel only; implementations must not influence
/// which rows are produced.
pub trait ProgressObserver {
    /// Called after each object is visited, with 1-based `processed`
    fn on_progress(&self, processed: usize, total: usize);
}

/// Observer that discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _processed: usize, _total: usize) {}
}

/// Observer that logs progress through `tracing`
#[derive(Debug)]
pub struct LoggingProgress {
    pub operation_id: String,
    pub operation_name: String,
    pub start_time: DateTime<Utc>,
    every: usize,
    last_reported: Mutex<usize>,
}

impl LoggingProgress {
    /// Create an observer reporting every 100 objects
    pub fn new(operation_name: &str) -> Self {
        Self::with_step(operation_name, 100)
    }

    /// Create an observer reporting every `every` objects
    pub fn with_step(operation_name: &str, every: usize) -> Self {
        Self {
            operation_id: Uuid::new_v4().to_string(),
            operation_name: operation_name.to_string(),
            start_time: Utc::now(),
            every: every.max(1),
            last_reported: Mutex::new(0),
        }
    }

    /// Number of the last object a progress line was emitted for
    pub fn last_reported(&self) -> usize {
        self.last_reported.lock().map(|last| *last).unwrap_or(0)
    }

    fn should_report(&self, processed: usize, total: usize) -> bool {
        processed % self.every == 0 || processed == total
    }
}

impl ProgressObserver for LoggingProgress {
    fn on_progress(&self, processed: usize, total: usize) {
        if !self.should_report(processed, total) {
            return;
        }

        let percentage = if total == 0 {
            100.0
        } else {
            (processed as f64 / total as f64) * 100.0
        };

        info!(
            operation_id = %self.operation_id,
            operation_name = %self.operation_name,
            processed = processed,
            total = total,
            "Progress: {}/{} ({:.1}%)", processed, total, percentage
        );

        if let Ok(mut last) = self.last_reported.lock() {
            *last = processed;
        }

        if processed == total {
            let duration_ms = Utc::now()
                .signed_duration_since(self.start_time)
                .num_milliseconds();
            info!(
                operation_id = %self.operation_id,
                operation_name = %self.operation_name,
                duration_ms = duration_ms,
                "Operation completed"
            );
        }
    }
}
