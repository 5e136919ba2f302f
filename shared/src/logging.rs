//! Tracing setup and the bounded activity log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;

use crate::errors::{SharedError, SharedResult};

/// Default number of entries retained by an activity log
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 1000;

/// Log levels accepted by [`init_tracing`]
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One timestamped activity message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

struct ActivityBuffer {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    evicted: u64,
}

/// Bounded ring buffer of activity entries
///
/// Cloning yields another handle onto the same buffer. Once `capacity`
/// entries are held, each new entry evicts the oldest one.
#[derive(Clone)]
pub struct ActivityLog {
    inner: Arc<Mutex<ActivityBuffer>>,
}

impl ActivityLog {
    /// Create a log holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(ActivityBuffer {
                entries: VecDeque::with_capacity(capacity.min(DEFAULT_ACTIVITY_CAPACITY)),
                capacity,
                evicted: 0,
            })),
        }
    }

    fn buffer(&self) -> MutexGuard<'_, ActivityBuffer> {
        // A panic while holding the lock cannot leave the deque half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a message stamped with the current time
    pub fn record(&self, level: &str, message: impl Into<String>) {
        self.push(ActivityEntry {
            timestamp: Utc::now(),
            level: level.to_string(),
            message: message.into(),
        });
    }

    pub fn push(&self, entry: ActivityEntry) {
        let mut buffer = self.buffer();
        while buffer.entries.len() >= buffer.capacity {
            buffer.entries.pop_front();
            buffer.evicted += 1;
        }
        buffer.entries.push_back(entry);
    }

    /// Snapshot of all retained entries, oldest first
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.buffer().entries.iter().cloned().collect()
    }

    /// The newest `n` entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<ActivityEntry> {
        let buffer = self.buffer();
        let skip = buffer.entries.len().saturating_sub(n);
        buffer.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer().capacity
    }

    /// Number of entries dropped to stay within capacity
    pub fn evicted_count(&self) -> u64 {
        self.buffer().evicted
    }

    pub fn clear(&self) {
        let mut buffer = self.buffer();
        buffer.entries.clear();
        buffer.evicted = 0;
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buffer = self.buffer();
        f.debug_struct("ActivityLog")
            .field("len", &buffer.entries.len())
            .field("capacity", &buffer.capacity)
            .field("evicted", &buffer.evicted)
            .finish()
    }
}

/// Tracing layer that mirrors events tagged `activity = true` into an [`ActivityLog`]
pub struct ActivityLayer {
    log: ActivityLog,
}

impl ActivityLayer {
    pub fn new(log: ActivityLog) -> Self {
        Self { log }
    }
}

impl<S> tracing_subscriber::Layer<S> for ActivityLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = ActivityVisitor::default();
        event.record(&mut visitor);

        if !visitor.activity {
            return;
        }

        let mut message = visitor.message;
        for (name, value) in visitor.fields {
            message.push_str(&format!(" {name}={value}"));
        }

        self.log.record(&event.metadata().level().to_string(), message);
    }
}

/// Visitor to extract the message, the activity flag and remaining fields
#[derive(Default)]
struct ActivityVisitor {
    message: String,
    activity: bool,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for ActivityVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message.push_str(&format!("{value:?}"));
        } else {
            self.fields.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        if field.name() == "activity" {
            self.activity = value;
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}

/// Build the per-crate filter directive for a base level
pub fn filter_directive(log_level: &str) -> SharedResult<String> {
    let level = log_level.trim().to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(SharedError::InvalidLogLevel {
            level: log_level.to_string(),
        });
    }
    Ok(format!("processor={level},shared={level}"))
}

/// Install the global subscriber, optionally mirroring activity events
pub fn try_init_tracing(log_level: &str, activity: Option<ActivityLog>) -> SharedResult<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let env_filter = EnvFilter::new(filter_directive(log_level)?);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(activity.map(ActivityLayer::new))
        .try_init()
        .map_err(|e| SharedError::TracingInit {
            message: e.to_string(),
        })
}

/// Install the global subscriber, ignoring a subscriber that is already set
pub fn init_tracing(log_level: &str, activity: Option<ActivityLog>) -> SharedResult<()> {
    match try_init_tracing(log_level, activity) {
        Err(SharedError::TracingInit { .. }) => Ok(()),
        other => other,
    }
}
