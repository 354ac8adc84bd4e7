//! Rendering of `log` records into single text lines.
//!
//! The engine ships plain strings; [`LineFormatter`] decides what each
//! record looks like before it is submitted. Closures with the matching
//! signature are formatters too.

use chrono::{SecondsFormat, Utc};
use log::Record;

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so one formatter can be
/// shared by every thread that logs.
pub trait LineFormatter: Send + Sync {
    /// Format a log record into a single line without a terminator.
    fn format(&self, record: &Record<'_>) -> String;
}

impl<F> LineFormatter for F
where
    F: Fn(&Record<'_>) -> String + Send + Sync,
{
    fn format(&self, record: &Record<'_>) -> String {
        self(record)
    }
}

/// Renders `<timestamp> <LEVEL> <target> <message>` with an RFC 3339 UTC
/// timestamp at millisecond precision.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl LineFormatter for DefaultFormatter {
    fn format(&self, record: &Record<'_>) -> String {
        format!(
            "{} {} {} {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            record.level(),
            record.target(),
            record.args()
        )
    }
}
