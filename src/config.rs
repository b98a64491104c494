use serde::{Deserialize, Serialize};
use std::env;

/// Service configuration, loaded from FOLIO_* environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,

    /// Directory for the sled database (submission records + stored
    /// contact messages).
    pub data_dir: String,

    /// Allowed CORS origins. Empty means: permissive in dev mode, no
    /// cross-origin access otherwise.
    pub cors_origins: Vec<String>,

    /// Dev mode relaxes CORS to Any.
    pub dev_mode: bool,

    /// Interval between cleanup sweeps of stale submission records.
    pub sweep_interval_secs: u64,

    /// Optional path to the portfolio profile TOML. Absent means the
    /// built-in placeholder profile.
    pub profile_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: "./folio_data".to_string(),
            cors_origins: Vec::new(),
            dev_mode: false,
            sweep_interval_secs: 3600,
            profile_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = env::var("FOLIO_PORT") {
            if let Ok(num) = val.parse::<u16>() {
                config.port = num;
            }
        }

        if let Ok(val) = env::var("FOLIO_DATA_DIR") {
            if !val.trim().is_empty() {
                config.data_dir = val;
            }
        }

        // FOLIO_CORS_ORIGINS: comma-separated allowlist
        if let Ok(val) = env::var("FOLIO_CORS_ORIGINS") {
            config.cors_origins = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = env::var("FOLIO_DEV") {
            config.dev_mode = val.trim() == "1" || val.trim().eq_ignore_ascii_case("true");
        }

        if let Ok(val) = env::var("FOLIO_SWEEP_SECS") {
            if let Ok(num) = val.parse::<u64>() {
                if num > 0 {
                    config.sweep_interval_secs = num;
                }
            }
        }

        if let Ok(val) = env::var("FOLIO_PROFILE_PATH") {
            if !val.trim().is_empty() {
                config.profile_path = Some(val);
            }
        }

        config
    }
}
