//! Diagnostics for the `itax` binary.
//!
//! Log lines go to stderr, never stdout, so `--output json` and
//! `--output csv` can be piped. A log file can be attached after startup
//! once the configuration has been read.

use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";

fn level_colour(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// `2025-07-31T10:15:02.118+05:30  WARN app.rs:58 message key=value`
struct LineFormat;

impl LineFormat {
    fn paint(
        writer: &mut Writer<'_>,
        colour: &str,
        text: impl std::fmt::Display,
    ) -> std::fmt::Result {
        if writer.has_ansi_escapes() {
            write!(writer, "{colour}{text}{RESET} ")
        } else {
            write!(writer, "{text} ")
        }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
        Self::paint(&mut writer, DIM, timestamp)?;
        Self::paint(&mut writer, level_colour(meta.level()), format_args!("{:>5}", meta.level()))?;

        if let (Some(path), Some(line)) = (meta.file(), meta.line()) {
            let file = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
            Self::paint(&mut writer, CYAN, format_args!("{file}:{line}"))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

type SharedFile = Arc<Mutex<Option<File>>>;

/// Log file target that can be attached after the subscriber is installed.
/// Lines are dropped while nothing is attached.
#[derive(Clone, Default)]
struct LogFile(SharedFile);

struct LogFileGuard<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileGuard<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

type Reloader<T> = Box<dyn Fn(T) -> Result<()> + Send + Sync>;

/// Runtime switches over the installed subscriber.
struct Controls {
    level: Reloader<String>,
    stderr: Reloader<bool>,
    file: SharedFile,
}

static CONTROLS: OnceLock<Controls> = OnceLock::new();

fn controls() -> Result<&'static Controls> {
    CONTROLS.get().ok_or_else(|| anyhow!("logging is not initialized"))
}

fn reloader<S, T>(
    handle: reload::Handle<EnvFilter, S>,
    what: &'static str,
    to_filter: impl Fn(T) -> Result<EnvFilter> + Send + Sync + 'static,
) -> Reloader<T>
where
    S: Subscriber + Send + Sync + 'static,
{
    Box::new(move |value| {
        let filter = to_filter(value)?;
        handle
            .reload(filter)
            .map_err(|e| anyhow!("failed to reload {what} filter: {e}"))
    })
}

/// `RUST_LOG` beats the configured level; a bad configured level falls back to `info`.
fn initial_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Replaces the active filter. Takes a bare level or a full directive such
/// as `itax_cli=debug,sqlx=warn`.
pub fn set_log_level(level: &str) -> Result<()> {
    (controls()?.level)(level.to_string())
}

/// Mutes or restores stderr output. The log file is unaffected.
pub fn set_stderr_enabled(enabled: bool) -> Result<()> {
    (controls()?.stderr)(enabled)
}

/// Appends log lines to `path`. The parent directory must exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let controls = controls()?;
    *controls.file.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    Ok(())
}

/// Installs the global subscriber. Later calls are ignored.
///
/// Stderr output is coloured only when stderr is a terminal.
pub fn init_logging(default_level: &str) {
    let log_file = LogFile::default();

    let (level_filter, level_handle) = reload::Layer::new(initial_filter(default_level));
    let (stderr_filter, stderr_handle) = reload::Layer::new(EnvFilter::new("trace"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .with_filter(stderr_filter);
    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(log_file.clone());

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return;
    }

    let _ = CONTROLS.set(Controls {
        level: reloader(level_handle, "level", |level: String| {
            EnvFilter::try_new(&level).map_err(|e| anyhow!("invalid log level '{level}': {e}"))
        }),
        // "trace" here only opens the gate; the level filter still applies.
        stderr: reloader(stderr_handle, "stderr", |enabled: bool| {
            Ok(EnvFilter::new(if enabled { "trace" } else { "off" }))
        }),
        file: log_file.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(emit: impl FnOnce()) -> String {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(LineFormat)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, emit);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn line_has_level_location_and_fields() {
        let line = capture(|| tracing::warn!(year = 2026, "falling back"));

        assert!(line.contains(" WARN "), "got: {line}");
        assert!(line.contains("logging.rs:"), "got: {line}");
        assert!(line.contains("falling back year=2026"), "got: {line}");
        assert!(line.ends_with('\n'));
        assert!(!line.contains("src/"), "got: {line}");
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let line = capture(|| tracing::error!("boom"));

        assert!(!line.contains('\x1b'), "got: {line:?}");
    }

    #[test]
    fn detached_log_file_swallows_lines() {
        let log_file = LogFile::default();

        let written = log_file.make_writer().write(b"dropped").unwrap();

        assert_eq!(written, 7);
    }
}
