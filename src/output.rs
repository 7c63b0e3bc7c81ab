// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Reports task lifecycle events as text, a single result line, or JSON lines.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use crate::service::DeleteResponse;
use crate::types::TaskId;

/// How lifecycle events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly lines for every event
    Text,
    /// Only the exit line
    Quiet,
    /// One JSON object per event
    Json,
}

/// A lifecycle event of the task being run.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Started {
        task: &'a TaskId,
        pid: u32,
    },
    Stopping {
        task: &'a TaskId,
        signal: u32,
    },
    Exited {
        task: &'a TaskId,
        pid: u32,
        exit_status: u32,
        exited_at: Option<DateTime<Utc>>,
        runtime_secs: f64,
    },
    Error {
        message: &'a str,
    },
}

impl Event<'_> {
    fn text(&self) -> String {
        match self {
            Event::Started { task, pid } => format!("  → Task {task} started (pid {pid})"),
            Event::Stopping { task, signal } => {
                format!("  → Stopping task {task} with signal {signal}...")
            }
            Event::Exited {
                task,
                exit_status,
                runtime_secs,
                ..
            } => format!("  ✓ Task {task} exited with status {exit_status} ({runtime_secs:.1}s)"),
            Event::Error { message } => format!("Error: {message}"),
        }
    }
}

/// Renders lifecycle events for one run.
pub struct Output {
    mode: OutputMode,
    started_at: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started_at: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Free-form progress line, text mode only.
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Text {
            println!("{message}");
        }
    }

    /// The init process is running. Starts the run clock.
    pub fn started(&mut self, task: &TaskId, pid: u32) {
        self.started_at = Some(Instant::now());
        self.emit(&Event::Started { task, pid });
    }

    pub fn stopping(&self, task: &TaskId, signal: u32) {
        self.emit(&Event::Stopping { task, signal });
    }

    /// The task has been deleted after its init process exited.
    pub fn exited(&self, deleted: &DeleteResponse) {
        let runtime_secs = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        self.emit(&Event::Exited {
            task: &deleted.id,
            pid: deleted.pid,
            exit_status: deleted.exit_status,
            exited_at: deleted.exited_at,
            runtime_secs,
        });
    }

    /// Errors always go to stderr.
    pub fn error(&self, message: &str) {
        let event = Event::Error { message };
        match self.mode {
            OutputMode::Text | OutputMode::Quiet => eprintln!("{}", event.text()),
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    fn emit(&self, event: &Event<'_>) {
        match self.mode {
            OutputMode::Text => println!("{}", event.text()),
            OutputMode::Quiet => {
                if matches!(event, Event::Exited { .. }) {
                    println!("{}", event.text().trim_start_matches("  ✓ "));
                }
            }
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(event) {
                    println!("{json}");
                }
            }
        }
    }
}
