//! INI parsing logic for converting `Ini` → `ConfigFile`.

use ini::Ini;

use crate::provider::StyleTileSource;

use super::file::{ConfigFile, ConfigFileError};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if v.is_empty() || v.contains('/') {
                return Err(invalid("server", "host", v, "must be a bare host name"));
            }
            config.server.host = v.to_string();
        }
        if let Some(v) = section.get("style") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("server", "style", v, "must not be empty"));
            }
            config.server.style = v.to_string();
        }
        if let Some(v) = section.get("template") {
            let v = v.trim();
            StyleTileSource::with_template(v, "", "")
                .map_err(|e| invalid("server", "template", v, &e.to_string()))?;
            config.server.template = v.to_string();
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("workers") {
            config.download.workers = match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("download", "workers", v, "must be a positive integer")),
            };
        }
        if let Some(v) = section.get("timeout") {
            config.download.timeout = match v.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(invalid(
                        "download",
                        "timeout",
                        v,
                        "must be a positive integer (seconds)",
                    ))
                }
            };
        }
        if let Some(v) = section.get("retries") {
            config.download.retries = v
                .trim()
                .parse()
                .map_err(|_| invalid("download", "retries", v, "must be a non-negative integer"))?;
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
