//! Tracing setup for the Bifrost binaries.
//!
//! A [`BifrostTracer`] collects layer configurations (stdout, journald, rolling files) and
//! installs them as the global subscriber in [`Tracer::init`].
//!
//! ```no_run
//! use bifrost_tracing::{BifrostTracer, LayerInfo, LogFormat, Tracer};
//!
//! let tracer = BifrostTracer::new().with_stdout(LayerInfo::new(
//!     LogFormat::Terminal,
//!     "info".to_string(),
//!     "bifrost_vm=debug".to_string(),
//!     Some("always".to_string()),
//! ));
//! let _guard = tracer.init().expect("failed to initialize tracing");
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export the tracing crates for consumers configuring their own filters.
pub use tracing;
pub use tracing_subscriber;

mod formatter;
mod layers;

pub use formatter::LogFormat;
pub use layers::{FileInfo, FileWorkerGuard};

use layers::Layers;

/// Tracer for the Bifrost binaries.
#[derive(Debug, Clone)]
pub struct BifrostTracer {
    stdout: LayerInfo,
    journald: Option<String>,
    file: Option<(LayerInfo, FileInfo)>,
}

impl BifrostTracer {
    /// A tracer with the default stdout layer only.
    pub fn new() -> Self {
        BifrostTracer { stdout: LayerInfo::default(), journald: None, file: None }
    }

    /// Replaces the stdout layer configuration.
    pub fn with_stdout(mut self, config: LayerInfo) -> Self {
        self.stdout = config;
        self
    }

    /// Enables logging to journald with the given filter.
    pub fn with_journald(mut self, filter: String) -> Self {
        self.journald = Some(filter);
        self
    }

    /// Enables logging to rolling files.
    pub fn with_file(mut self, config: LayerInfo, file_info: FileInfo) -> Self {
        self.file = Some((config, file_info));
        self
    }
}

impl Default for BifrostTracer {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of one tracing layer.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    color: Option<String>,
}

impl LayerInfo {
    /// Creates a layer configuration.
    ///
    /// `default_directive` applies when `RUST_LOG` is unset, `filters` is a comma-separated list
    /// of extra directives, and `color` is a color mode name (`None` disables colors).
    pub fn new(
        format: LogFormat,
        default_directive: String,
        filters: String,
        color: Option<String>,
    ) -> Self {
        Self { format, default_directive, filters, color }
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            format: LogFormat::Terminal,
            default_directive: "info".to_string(),
            filters: String::new(),
            color: Some("always".to_string()),
        }
    }
}

/// Installs a global tracing subscriber.
pub trait Tracer {
    /// Installs the subscriber. Returns the file worker guard if file logging is enabled.
    ///
    /// Installing a second global subscriber is a no-op.
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>>;
}

impl Tracer for BifrostTracer {
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>> {
        let mut layers = Layers::new();

        layers.stdout(
            self.stdout.format,
            self.stdout.default_directive.parse()?,
            &self.stdout.filters,
            self.stdout.color,
        )?;

        if let Some(filter) = self.journald {
            layers.journald(&filter)?;
        }

        let file_guard = match self.file {
            Some((config, file_info)) => {
                Some(layers.file(config.format, &config.filters, file_info)?)
            }
            None => None,
        };

        let _ = tracing_subscriber::registry().with(layers.into_inner()).try_init();
        Ok(file_guard)
    }
}

/// Installs a debug-level terminal subscriber for tests. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = BifrostTracer::new()
        .with_stdout(LayerInfo::new(
            LogFormat::Terminal,
            "debug".to_string(),
            String::new(),
            Some("always".to_string()),
        ))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
        tracing::debug!("tracing initialized twice");
    }

    #[test]
    fn test_invalid_default_directive() {
        let tracer = BifrostTracer::new().with_stdout(LayerInfo::new(
            LogFormat::Json,
            "bifrost_vm=loud".to_string(),
            String::new(),
            None,
        ));
        assert!(tracer.init().is_err());
    }
}
