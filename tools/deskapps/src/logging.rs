use crate::errors::DeskError;
use crate::log_retention::enforce_total_budget;
use crate::types::AppKind;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_DISK_BUDGET_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub app: AppKind,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

#[derive(Serialize)]
struct LogLine<'a> {
    level: &'a str,
    event_type: &'a str,
    app: &'a str,
    payload: Value,
}

impl JsonlLogger {
    /// Logs for `app` go to `<dir>/<app>.jsonl`.
    pub fn for_app(dir: impl AsRef<Path>, app: AppKind) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.jsonl", app.as_str())),
            app,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
        }
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), DeskError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DeskError::Io(e.to_string()))?;
        }
        let line = serde_json::to_string(&LogLine {
            level: event.level,
            event_type: event.event_type,
            app: self.app.as_str(),
            payload: truncate_json(event.payload.clone(), self.max_payload_bytes),
        })
        .map_err(|e| DeskError::Io(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| DeskError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .map_err(|e| DeskError::Io(e.to_string()))?;
        file.write_all(b"\n")
            .map_err(|e| DeskError::Io(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            let _ = enforce_total_budget(parent, &self.path, self.budget_bytes)?;
        }

        Ok(())
    }
}

/// Best-effort event sink for a session. Write failures are reported on
/// stderr once and otherwise ignored.
#[derive(Debug, Default)]
pub struct SessionLog {
    logger: Option<JsonlLogger>,
    warned: std::cell::Cell<bool>,
}

impl SessionLog {
    pub fn new(logger: JsonlLogger) -> Self {
        Self {
            logger: Some(logger),
            warned: std::cell::Cell::new(false),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.logger.as_ref().map(|logger| logger.path.as_path())
    }

    pub fn info(&self, event_type: &str, payload: Value) {
        self.emit("info", event_type, payload);
    }

    pub fn warn(&self, event_type: &str, payload: Value) {
        self.emit("warn", event_type, payload);
    }

    pub fn error(&self, event_type: &str, payload: Value) {
        self.emit("error", event_type, payload);
    }

    fn emit(&self, level: &str, event_type: &str, payload: Value) {
        let Some(logger) = &self.logger else {
            return;
        };
        let event = LogEvent {
            level,
            event_type,
            payload,
        };
        if let Err(error) = logger.append(&event) {
            if !self.warned.replace(true) {
                eprintln!("deskapps: event log unavailable: {error}");
            }
        }
    }
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}
