//! Injected logging handle
//!
//! The router and every reply context log through a `Logger` handed to them at
//! construction instead of calling the `log` macros directly. The default
//! handle forwards to whichever backend the binary installed (`env_logger`).

use log::{Level, Log, Metadata, Record};
use std::fmt;
use std::sync::Arc;

/// Default target used for framework log records
pub const DEFAULT_TARGET: &str = "interaction_router";

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl Logger {
    /// Logger writing to an explicit sink
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self {
            sink,
            target: DEFAULT_TARGET,
        }
    }

    /// Logger forwarding to the process-wide `log` backend
    pub fn global() -> Self {
        Self::new(Arc::new(GlobalSink))
    }

    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(module_path!()))
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}

struct GlobalSink;

impl Log for GlobalSink {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Sink that keeps every record in memory
    #[derive(Default)]
    pub struct CapturingLog {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl CapturingLog {
        pub fn records(&self) -> Vec<(Level, String)> {
            self.records.lock().unwrap().clone()
        }

        pub fn contains(&self, level: Level, needle: &str) -> bool {
            self.records()
                .iter()
                .any(|(l, msg)| *l == level && msg.contains(needle))
        }
    }

    impl Log for CapturingLog {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    pub fn capturing_logger() -> (Logger, Arc<CapturingLog>) {
        let sink = Arc::new(CapturingLog::default());
        (Logger::new(sink.clone()), sink)
    }
}
