// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use crate::deploy::Outcome;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with the planned actions
    Normal,
    /// Minimal output for CI (only final state)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print the result of a reconciliation pass.
    pub fn outcome(&self, outcome: &Outcome) {
        match self.mode {
            OutputMode::Normal => {
                for line in render_outcome(outcome) {
                    println!("{line}");
                }
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("Finished in {elapsed:.1}s");
                }
            }
            OutputMode::Quiet => println!("{}", outcome.state),
            OutputMode::Json => {
                let event = OutcomeEvent {
                    event: "outcome",
                    outcome,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print a success message.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.json_event("success", message, false),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.json_event("error", message, true),
        }
    }

    fn json_event(&self, event: &str, message: &str, to_stderr: bool) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.duration(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            if to_stderr {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }
}

/// Human-readable summary lines for a pass.
pub fn render_outcome(outcome: &Outcome) -> Vec<String> {
    let mut lines = Vec::new();
    let prefix = if outcome.dry_run { "[dry-run] " } else { "" };

    if outcome.actions.is_empty() {
        lines.push(format!("{prefix}No actions planned"));
    } else {
        let verb = if outcome.dry_run { "Planned" } else { "Applied" };
        lines.push(format!("{prefix}{verb} {} action(s):", outcome.actions.len()));
        for (i, action) in outcome.actions.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, action));
        }
    }

    if !outcome.pending_prepares.is_empty() {
        let pending: Vec<String> = outcome
            .pending_prepares
            .iter()
            .map(|p| p.to_string())
            .collect();
        lines.push(format!("Pending prepares: {}", pending.join(", ")));
    }

    lines.push(format!("State: {}", outcome.state));
    lines
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct OutcomeEvent<'a> {
    event: &'a str,
    #[serde(flatten)]
    outcome: &'a Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
