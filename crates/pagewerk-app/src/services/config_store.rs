// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Config file persistence.

use std::path::Path;

use pagewerk_core::AppConfig;
use pagewerk_core::error::Result;
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";

/// Load `<data_dir>/config.json`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_config(data_dir: &Path) -> AppConfig {
    let path = data_dir.join(CONFIG_FILE);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), %err, "No config file, using defaults");
            return AppConfig::default();
        }
    };
    serde_json::from_str(&data).unwrap_or_else(|err| {
        warn!(path = %path.display(), %err, "Ignoring malformed config file");
        AppConfig::default()
    })
}

/// Write `config` to `<data_dir>/config.json` as pretty JSON.
pub fn save_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewerk_core::{PageSize, RenderMode};

    #[test]
    fn saved_config_loads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig {
            default_page_size: PageSize::new(595, 842),
            render_mode: RenderMode::Print,
            max_photos: 25,
            ..AppConfig::default()
        };
        save_config(tmp.path(), &config).unwrap();
        assert_eq!(load_config(tmp.path()), config);
    }

    #[test]
    fn missing_or_broken_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(load_config(tmp.path()), AppConfig::default());

        std::fs::write(tmp.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert_eq!(load_config(tmp.path()), AppConfig::default());
    }
}
