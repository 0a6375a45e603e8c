// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Log output of the counter client.
//!
//! Events always go to stderr. When a log directory is configured, they are also appended
//! to `<directory>/<log_name>.log`, without colors. Verbosity is read from `RUST_LOG`, and
//! colors are disabled by a non-empty `NO_COLOR` or when stderr is not a terminal.

use std::{
    env, fmt,
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use is_terminal::IsTerminal as _;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{
        self as tracing_fmt,
        format::{FmtSpan, Format, Full},
        time::FormatTime,
        FormatFields, MakeWriter,
    },
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::{SubscriberInitExt as _, TryInitError},
    EnvFilter,
};

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("unknown log format {0:?}, expected `plain`, `json` or `pretty`")]
    UnknownFormat(String),

    #[error(
        "unknown span event {0:?}, expected `new`, `enter`, `exit`, `close`, `active` or `full`"
    )]
    UnknownSpanEvent(String),

    #[error("failed to open the log file {}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// How each event is laid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = TracingError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.trim() {
            "plain" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(TracingError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Plain => write!(f, "plain"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Which span lifecycle events are logged, parsed from a comma-separated list such as
/// `new,close`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanEvents(pub FmtSpan);

impl Default for SpanEvents {
    fn default() -> Self {
        SpanEvents(FmtSpan::NONE)
    }
}

impl FromStr for SpanEvents {
    type Err = TracingError;

    fn from_str(events: &str) -> Result<Self, Self::Err> {
        let mut spans = FmtSpan::NONE;
        for event in events.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            spans |= match event {
                "new" => FmtSpan::NEW,
                "enter" => FmtSpan::ENTER,
                "exit" => FmtSpan::EXIT,
                "close" => FmtSpan::CLOSE,
                "active" => FmtSpan::ACTIVE,
                "full" => FmtSpan::FULL,
                other => return Err(TracingError::UnknownSpanEvent(other.to_string())),
            };
        }
        Ok(SpanEvents(spans))
    }
}

/// Where and how the client logs.
#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub span_events: SpanEvents,
    /// The directory receiving a log file, if any.
    pub directory: Option<PathBuf>,
}

impl LogConfig {
    /// The file events are appended to, named after `log_name`.
    pub fn log_file_path(&self, log_name: &str) -> Option<PathBuf> {
        let mut path = self.directory.as_ref()?.join(log_name);
        path.set_extension("log");
        Some(path)
    }
}

/// Installs the global subscriber.
pub fn init(log_name: &str, config: &LogConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let color = !env::var("NO_COLOR").is_ok_and(|value| !value.is_empty())
        && io::stderr().is_terminal();

    let stderr_layer = formatted_layer(
        config.format,
        tracing_fmt::layer()
            .with_span_events(config.span_events.0.clone())
            .with_writer(io::stderr)
            .with_ansi(color),
    );
    let file_layer = match config.log_file_path(log_name) {
        Some(path) => {
            let file = open_log_file(&path)?;
            Some(formatted_layer(
                config.format,
                tracing_fmt::layer()
                    .with_span_events(config.span_events.0.clone())
                    .with_writer(Arc::new(file))
                    .with_ansi(false),
            ))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File, TracingError> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| TracingError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn formatted_layer<S, N, W, T>(
    format: LogFormat,
    layer: tracing_fmt::Layer<S, N, Format<Full, T>, W>,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + Send + Sync + 'static,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    T: FormatTime + Send + Sync + 'static,
{
    match format {
        LogFormat::Plain => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_log_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
        assert_matches!(
            "yaml".parse::<LogFormat>(),
            Err(TracingError::UnknownFormat(format)) if format == "yaml"
        );
    }

    #[test]
    fn test_span_events() {
        assert_eq!(
            "new, close".parse::<SpanEvents>().unwrap(),
            SpanEvents(FmtSpan::NEW | FmtSpan::CLOSE)
        );
        assert_eq!("".parse::<SpanEvents>().unwrap(), SpanEvents::default());
        assert_matches!(
            "new,bogus".parse::<SpanEvents>(),
            Err(TracingError::UnknownSpanEvent(event)) if event == "bogus"
        );
    }

    #[test]
    fn test_log_file() {
        let config = LogConfig::default();
        assert_eq!(config.log_file_path("counter-dapp"), None);

        let directory = env::temp_dir().join("counter-dapp-missing-directory");
        let config = LogConfig {
            directory: Some(directory.clone()),
            ..LogConfig::default()
        };
        let path = config.log_file_path("counter-dapp").unwrap();
        assert_eq!(path, directory.join("counter-dapp.log"));
        assert_matches!(
            open_log_file(&path),
            Err(TracingError::LogFile { path: failed, .. }) if failed == path
        );
    }
}
