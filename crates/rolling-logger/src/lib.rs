//! Rolling Logger
//!
//! A `tracing` subscriber whose fmt layer writes every event to the browser
//! console (or stderr off-wasm) and keeps the most recent lines in a circular
//! buffer, so the UI can show them without a file system. Records from the
//! `log` macros are bridged into the same subscriber.
//!
//! Line format: `HH:MM:SS.mmm LEVEL target: message`

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

/// Lines kept in memory before the oldest are dropped
pub const DEFAULT_CAPACITY: usize = 500;

static BUFFER: OnceLock<RingBuffer> = OnceLock::new();

/// Shared circular buffer of formatted lines
#[derive(Clone)]
pub struct RingBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
    echo: bool,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)))),
            capacity: capacity.max(1),
            echo: true,
        }
    }

    /// Keep lines in memory only, without console output
    pub fn silent(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Buffered lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    fn push(&self, line: String) {
        let mut lines = self.lines.lock();
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }
}

/// Collects one formatted event, then hands it to the buffer on drop
pub struct LineWriter {
    buffer: RingBuffer,
    level: Level,
    bytes: Vec<u8>,
}

impl io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.bytes);
        for line in text.lines().filter(|line| !line.is_empty()) {
            if self.buffer.echo {
                emit(self.level, line);
            }
            self.buffer.push(line.to_string());
        }
    }
}

impl<'a> MakeWriter<'a> for RingBuffer {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            buffer: self.clone(),
            level: Level::INFO,
            bytes: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LineWriter {
            buffer: self.clone(),
            level: *meta.level(),
            bytes: Vec::new(),
        }
    }
}

/// Local wall-clock time; `std::time` is unavailable in the browser
struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&value),
        Level::WARN => web_sys::console::warn_1(&value),
        Level::INFO => web_sys::console::info_1(&value),
        _ => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

fn level_filter(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Registry with a level filter and a fmt layer writing into `buffer`
pub fn subscriber(buffer: RingBuffer, level: log::LevelFilter) -> impl Subscriber + Send + Sync {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(buffer)
        .with_ansi(false)
        .with_timer(ClockTime)
        .with_target(true);

    tracing_subscriber::registry()
        .with(level_filter(level))
        .with(layer)
}

/// Install the global subscriber and the `log` bridge.
/// Returns false if one was already installed.
pub fn init_logger(app_name: &str, level: log::LevelFilter) -> bool {
    let mut created = false;
    let buffer = BUFFER.get_or_init(|| {
        created = true;
        RingBuffer::new(DEFAULT_CAPACITY)
    });
    if !created {
        return false;
    }
    if subscriber(buffer.clone(), level).try_init().is_err() {
        return false;
    }
    tracing::info!("[LOGGER] {} logging at {}", app_name, level);
    true
}

/// Lines captured by the global subscriber, oldest first
pub fn recent_lines() -> Vec<String> {
    BUFFER.get().map(RingBuffer::lines).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(capacity: usize, level: log::LevelFilter, f: impl FnOnce()) -> Vec<String> {
        let buffer = RingBuffer::new(capacity).silent();
        tracing::subscriber::with_default(subscriber(buffer.clone(), level), f);
        buffer.lines()
    }

    #[test]
    fn test_line_format() {
        let lines = capture(10, log::LevelFilter::Trace, || {
            tracing::warn!(target: "taskboard::app", "hello {}", 1);
        });

        assert_eq!(lines.len(), 1);
        let (stamp, rest) = lines[0].split_once(' ').unwrap();
        assert_eq!(stamp.len(), "12:34:56.789".len());
        assert_eq!(rest.trim_start(), "WARN taskboard::app: hello 1");
    }

    #[test]
    fn test_buffer_drops_oldest() {
        let lines = capture(2, log::LevelFilter::Trace, || {
            tracing::info!("one");
            tracing::info!("two");
            tracing::info!("three");
        });

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("two"));
        assert!(lines[1].ends_with("three"));
    }

    #[test]
    fn test_level_filter() {
        let lines = capture(10, log::LevelFilter::Info, || {
            tracing::debug!("hidden");
            tracing::error!("shown");
        });

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR"));
    }

    #[test]
    fn test_init_is_idempotent_and_bridges_log() {
        assert!(init_logger("taskboard", log::LevelFilter::Debug));
        assert!(!init_logger("taskboard", log::LevelFilter::Trace));
        log::warn!("after init");
        assert!(recent_lines().iter().any(|l| l.ends_with("after init")));
    }
}
