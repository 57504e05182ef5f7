//! Structured Logging
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a `fmt`
//! layer, plain text for development and JSON for log aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level
    #[default]
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error
    Stderr,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level, overridden by `RUST_LOG` when set
    pub level: LogLevel,
    /// Enable structured JSON output
    pub structured: bool,
    /// Include caller location
    pub include_location: bool,
    /// Include thread IDs (useful to see rayon workers)
    pub include_thread_ids: bool,
    /// Output target
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            structured: false,
            include_location: false,
            include_thread_ids: false,
            output: LogOutput::Stdout,
        }
    }
}

impl LogConfig {
    /// Development configuration
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            structured: false,
            include_location: true,
            ..Default::default()
        }
    }

    /// Production configuration
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            structured: true,
            include_thread_ids: true,
            output: LogOutput::Stderr,
            ..Default::default()
        }
    }

    /// Set the default level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Initialize logging.
    ///
    /// A second call is a no-op: the first installed subscriber wins.
    pub fn init(&self) -> crate::error::Result<()> {
        use tracing_subscriber::fmt::writer::BoxMakeWriter;
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        let writer = match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        };

        let subscriber = tracing_subscriber::registry().with(filter);

        if self.structured {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_thread_ids(self.include_thread_ids)
                .with_file(self.include_location)
                .with_line_number(self.include_location);

            subscriber.with(layer).try_init().ok();
        } else {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_thread_ids(self.include_thread_ids)
                .with_file(self.include_location)
                .with_line_number(self.include_location);

            subscriber.with(layer).try_init().ok();
        }

        Ok(())
    }
}

/// Structured logger builder
pub struct StructuredLogger {
    level: LogLevel,
    message: Option<String>,
    kernel_id: Option<String>,
    fields: BTreeMap<String, serde_json::Value>,
}

impl StructuredLogger {
    /// Create a new logger at debug level
    pub fn debug() -> Self {
        Self::new(LogLevel::Debug)
    }

    /// Create a new logger at info level
    pub fn info() -> Self {
        Self::new(LogLevel::Info)
    }

    /// Create a new logger at warn level
    pub fn warn() -> Self {
        Self::new(LogLevel::Warn)
    }

    /// Create a new logger at error level
    pub fn error() -> Self {
        Self::new(LogLevel::Error)
    }

    fn new(level: LogLevel) -> Self {
        Self {
            level,
            message: None,
            kernel_id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Set the message
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Set the kernel ID
    pub fn kernel(mut self, id: impl Into<String>) -> Self {
        self.kernel_id = Some(id.into());
        self
    }

    /// Add a field
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.fields.insert(key.into(), json_value);
        }
        self
    }

    fn fields_json(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_default()
    }

    /// Emit the log
    pub fn log(self) {
        let fields = self.fields_json();
        let msg = self.message.unwrap_or_default();
        let kernel_id = self.kernel_id.as_deref().unwrap_or("-");

        match self.level {
            LogLevel::Trace => tracing::trace!(kernel_id, fields = %fields, "{}", msg),
            LogLevel::Debug => tracing::debug!(kernel_id, fields = %fields, "{}", msg),
            LogLevel::Info => tracing::info!(kernel_id, fields = %fields, "{}", msg),
            LogLevel::Warn => tracing::warn!(kernel_id, fields = %fields, "{}", msg),
            LogLevel::Error => tracing::error!(kernel_id, fields = %fields, "{}", msg),
        }
    }
}
