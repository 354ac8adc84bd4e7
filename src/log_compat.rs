//! Compatibility bridge for the Rust `log` crate.
//!
//! [`LogentriesLogger`] implements `log::Log` by rendering each record with a
//! [`LineFormatter`] and submitting it to a shared [`LogentriesEngine`].
//! Records emitted under the engine's own diagnostic target are skipped so
//! diagnostics never feed back into the queue.

use std::sync::Arc;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::{
    delivery::{Connector, LogentriesEngine, TcpConnector},
    diagnostics::DIAGNOSTIC_TARGET,
    formatter::{DefaultFormatter, LineFormatter},
};

/// Adapter implementing the Rust `log::Log` trait on top of an engine.
pub struct LogentriesLogger<C: Connector = TcpConnector> {
    engine: Arc<LogentriesEngine<C>>,
    formatter: Box<dyn LineFormatter>,
    level: LevelFilter,
}

impl<C: Connector> LogentriesLogger<C> {
    /// Forward records at `Info` and above using [`DefaultFormatter`].
    pub fn new(engine: Arc<LogentriesEngine<C>>) -> Self {
        Self {
            engine,
            formatter: Box::new(DefaultFormatter),
            level: LevelFilter::Info,
        }
    }

    pub fn with_formatter(mut self, formatter: impl LineFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn engine(&self) -> &Arc<LogentriesEngine<C>> {
        &self.engine
    }

    /// Register this logger as the global `log` logger.
    ///
    /// Fails when another global logger is already installed.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn is_diagnostic_target(target: &str) -> bool {
    target
        .strip_prefix(DIAGNOSTIC_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl<C: Connector> log::Log for LogentriesLogger<C> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level && !is_diagnostic_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.formatter.format(record);
        self.engine.submit(&line, None);
    }

    fn flush(&self) {}
}

impl<C: Connector> std::fmt::Debug for LogentriesLogger<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogentriesLogger")
            .field("engine", &self.engine)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}
