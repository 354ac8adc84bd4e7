//! INI configuration loading.
//!
//! Reads the `[logentries]` section of an INI file with `rust-ini` and seeds
//! an [`EngineBuilder`] from it. Unknown keys are ignored; missing keys keep
//! the builder defaults.

use std::path::Path;

use ini::{Ini, Properties};

use crate::builder::{ConfigError, EngineBuilder, parse_flag};

/// Section holding the engine settings.
pub const INI_SECTION: &str = "logentries";

impl EngineBuilder {
    /// Seed a builder from the `[logentries]` section of the INI file at
    /// `path`.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path)?;
        Self::from_ini(&ini)
    }

    /// Seed a builder from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini =
            Ini::load_from_str(text).map_err(|err| ConfigError::Ini(ini::Error::Parse(err)))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut builder = Self::new();
        let Some(section) = ini.section(Some(INI_SECTION)) else {
            return Ok(builder);
        };
        if let Some(token) = section.get("token") {
            builder = builder.with_token(token.trim());
        }
        if let Some(debug) = section.get("debug") {
            builder = builder.with_debug(parse_flag(debug));
        }
        if section.contains_key("host") || section.contains_key("port") {
            let host = section
                .get("host")
                .unwrap_or(crate::delivery::DEFAULT_HOST)
                .trim();
            let port = parse_number::<u16>(section, "port")?
                .unwrap_or(crate::delivery::DEFAULT_PORT);
            builder = builder.with_tcp(host, port);
        }
        let tls_domain = section
            .get("tls_domain")
            .map(|domain| domain.trim().to_owned());
        let tls = section.get("tls").map(parse_flag).unwrap_or(false);
        if tls || tls_domain.is_some() {
            builder = builder.with_tls(tls_domain, false);
        }
        if let Some(capacity) = parse_number::<usize>(section, "capacity")? {
            builder = builder.with_capacity(capacity);
        }
        Ok(builder)
    }
}

fn parse_number<T: std::str::FromStr>(
    section: &Properties,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    section
        .get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                ConfigError::InvalidConfig(format!(
                    "{key} must be a non-negative integer, got {raw:?}"
                ))
            })
        })
        .transpose()
}
