//! Logging setup
//!
//! Console output goes through the usual `tracing_subscriber` fmt layer.
//! Every event is also kept in an in-memory [`LogBuffer`] so it can be
//! shown in-app, searched, or written to disk.

use crate::error::Result;
use chrono::Local;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::Layer;

pub const DEFAULT_FILTER: &str = "vocabulary=debug,info";

#[derive(Debug, Default)]
struct Lines {
    lines: Vec<String>,
    closed: bool,
}

/// Append-only log sink shared by the whole process
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<Lines>>,
}

static GLOBAL: OnceLock<LogBuffer> = OnceLock::new();

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer installed by [`init`]
    pub fn global() -> &'static LogBuffer {
        GLOBAL.get_or_init(LogBuffer::new)
    }

    fn lock(&self) -> MutexGuard<'_, Lines> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, line: impl Into<String>) {
        let mut inner = self.lock();
        if !inner.closed {
            inner.lines.push(line.into());
        }
    }

    /// Every recorded line, newline separated
    pub fn contents(&self) -> String {
        self.lock().lines.join("\n")
    }

    /// Lines containing `keyword`, each terminated by a newline
    pub fn matching(&self, keyword: &str) -> String {
        self.lock()
            .lines
            .iter()
            .filter(|line| line.contains(keyword))
            .fold(String::new(), |mut out, line| {
                out.push_str(line);
                out.push('\n');
                out
            })
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the current contents to `path`
    pub async fn flush_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = self.contents();
        tokio::fs::write(path, contents).await?;

        Ok(())
    }

    /// Stop recording; later events are discarded
    pub fn close(&self) {
        self.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for LogBuffer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.push(format!(
            "{} {} {}: {}{}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            metadata.level(),
            metadata.target(),
            visitor.message,
            visitor.fields
        ));
    }
}

/// Install the global subscriber: env filter, console output and the buffer
pub fn init(filter: &str, buffer: &LogBuffer) -> std::result::Result<(), TryInitError> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(buffer.clone())
        .try_init()
}
