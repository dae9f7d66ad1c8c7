//! Logging setup
//!
//! Installs the global `tracing` subscriber used by the runner binary.

use tracing_subscriber::EnvFilter;

/// Subscriber options
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Directive used when `RUST_LOG` is unset
    pub default_directive: String,
    /// Emit one JSON object per event
    pub json: bool,
    /// Include the event target (module path)
    pub with_target: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            json: false,
            with_target: false,
        }
    }
}

impl LoggingOptions {
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.default_directive))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber writing to stderr.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(options: &LoggingOptions) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(options.env_filter())
        .with_target(options.with_target)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if options.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
