//! Session reports
//!
//! A session returns everything the surrounding application needs to know:
//! the ordered log lines, the optional image URL signal and how the session
//! ended. Each line is mirrored to `tracing` as it is recorded.

use derive_more::Display;
use tracing::{error, info, warn};

/// Severity of a log line
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Progress and informational lines
    #[display("INFO")]
    Info,
    /// Failures: transport errors, rejected authentication
    #[display("ERROR")]
    Error,
}

/// A single log line produced during a session
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{level}: {message}")]
pub struct LogEvent {
    /// Severity
    pub level: LogLevel,
    /// Text of the line
    pub message: String,
}

/// Emitted at most once per MIFARE session when a URL marker was decoded
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{url}")]
pub struct ImageUrlSignal {
    /// Full image URL
    pub url: String,
}

impl ImageUrlSignal {
    /// Create a new signal
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// How a session ended
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session ran to completion
    #[default]
    Completed,
    /// The tag answered but is not ours (status word or account mismatch)
    #[display("not applicable")]
    NotApplicable,
    /// The tag exposes neither supported capability
    Unsupported,
    /// A transport failure or bad configuration ended the session
    Failed,
}

/// Everything a session produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    events: Vec<LogEvent>,
    image_url: Option<ImageUrlSignal>,
    outcome: SessionOutcome,
}

impl SessionReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an informational line
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.events.push(LogEvent {
            level: LogLevel::Info,
            message,
        });
    }

    /// Record an error line
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.events.push(LogEvent {
            level: LogLevel::Error,
            message,
        });
    }

    /// Set the image URL signal. Only the first call has an effect.
    pub fn emit_image_url(&mut self, url: impl Into<String>) {
        if let Some(existing) = &self.image_url {
            warn!(%existing, "Image URL already emitted for this session");
            return;
        }
        self.image_url = Some(ImageUrlSignal::new(url));
    }

    /// Set the outcome
    pub const fn set_outcome(&mut self, outcome: SessionOutcome) {
        self.outcome = outcome;
    }

    /// Log lines in the order they were recorded
    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Messages only, in order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.message.as_str())
    }

    /// Error lines only
    pub fn errors(&self) -> impl Iterator<Item = &LogEvent> {
        self.events
            .iter()
            .filter(|event| event.level == LogLevel::Error)
    }

    /// The image URL signal, if one was emitted
    pub const fn image_url(&self) -> Option<&ImageUrlSignal> {
        self.image_url.as_ref()
    }

    /// How the session ended
    pub const fn outcome(&self) -> SessionOutcome {
        self.outcome
    }
}
