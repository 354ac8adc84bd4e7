//! Opt-in diagnostic output for the delivery engine.
//!
//! Messages go through the `log` facade under [`DIAGNOSTIC_TARGET`] so the
//! host application decides where they land. Nothing is emitted unless the
//! engine was configured with `debug = true`.

use std::fmt;

/// `log` target used for every diagnostic message.
pub const DIAGNOSTIC_TARGET: &str = "logentries";

const PREFIX: &str = "LE: ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    enabled: bool,
}

impl Diagnostics {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            log::debug!(target: DIAGNOSTIC_TARGET, "{PREFIX}{args}");
        }
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            log::warn!(target: DIAGNOSTIC_TARGET, "{PREFIX}{args}");
        }
    }
}
