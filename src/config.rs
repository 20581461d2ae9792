//! Environment configuration.

use std::env;
use std::path::{Path, PathBuf};

use session_store::state_file_path;
use webface_api::DEFAULT_BASE_URL;

/// Which conversation surface the client drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// One-to-one chat with session rotation, overlay pages and glitches.
    #[default]
    Direct,
    /// Multi-agent forum with staggered batch delivery.
    Forum,
}

impl Mode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat" | "direct" => Some(Self::Direct),
            "forum" => Some(Self::Forum),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "chat",
            Self::Forum => "forum",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub base_url: String,
    pub mode: Mode,
    pub state_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub log_filter: Option<String>,
    pub log_file: Option<String>,
    pub debug: bool,
    /// Values that were present but unusable, reported once logging is up.
    pub warnings: Vec<String>,
}

pub const BASE_URL_ENV: &str = "WEBFACE_BASE_URL";
pub const MODE_ENV: &str = "WEBFACE_MODE";
pub const STATE_PATH_ENV: &str = "WEBFACE_STATE_PATH";
pub const SEED_ENV: &str = "WEBFACE_SEED";
pub const LOG_ENV: &str = "WEBFACE_LOG";
pub const LOG_FILE_ENV: &str = "WEBFACE_LOG_FILE";
pub const DEBUG_ENV: &str = "WEBFACE_DEBUG";

impl EnvConfig {
    pub fn from_env() -> Self {
        let mut warnings = Vec::new();

        let mode = match env_string_opt(MODE_ENV) {
            None => Mode::default(),
            Some(raw) => Mode::parse(&raw).unwrap_or_else(|| {
                warnings.push(format!("{MODE_ENV}={raw:?} is not chat or forum; using chat"));
                Mode::default()
            }),
        };

        let seed = env_string_opt(SEED_ENV).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warnings.push(format!("{SEED_ENV}={raw:?} is not a u64; seeding from entropy"));
                None
            }
        });

        Self {
            base_url: env_string_opt(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            mode,
            state_path: env_string_opt(STATE_PATH_ENV).map(PathBuf::from),
            seed,
            log_filter: env_string_opt(LOG_ENV),
            log_file: env_string_opt(LOG_FILE_ENV),
            debug: env_flag(DEBUG_ENV),
            warnings,
        }
    }

    /// Explicit state path, or the default file under `cwd`.
    pub fn resolved_state_path(&self, cwd: &Path) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| state_file_path(cwd))
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{
        EnvConfig, Mode, BASE_URL_ENV, DEBUG_ENV, LOG_ENV, LOG_FILE_ENV, MODE_ENV, SEED_ENV,
        STATE_PATH_ENV,
    };
    use std::env;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    fn clear_all() -> Vec<EnvGuard> {
        [
            BASE_URL_ENV,
            MODE_ENV,
            STATE_PATH_ENV,
            SEED_ENV,
            LOG_ENV,
            LOG_FILE_ENV,
            DEBUG_ENV,
        ]
        .into_iter()
        .map(|key| set_env_guard(key, None))
        .collect()
    }

    #[test]
    fn env_defaults() {
        let _lock = env_lock();
        let _guards = clear_all();

        let config = EnvConfig::from_env();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.mode, Mode::Direct);
        assert!(config.state_path.is_none());
        assert!(config.seed.is_none());
        assert!(config.log_filter.is_none());
        assert!(config.log_file.is_none());
        assert!(!config.debug);
        assert!(config.warnings.is_empty());
        assert_eq!(
            config.resolved_state_path(Path::new("/work")),
            PathBuf::from("/work/.webface/state.json")
        );
    }

    #[test]
    fn env_values_are_read() {
        let _lock = env_lock();
        let _guards = clear_all();
        let _g1 = set_env_guard(BASE_URL_ENV, Some("http://example.org:9000"));
        let _g2 = set_env_guard(MODE_ENV, Some("Forum"));
        let _g3 = set_env_guard(STATE_PATH_ENV, Some("/tmp/webface.json"));
        let _g4 = set_env_guard(SEED_ENV, Some("42"));
        let _g5 = set_env_guard(LOG_ENV, Some("webface=trace"));
        let _g6 = set_env_guard(LOG_FILE_ENV, Some("/tmp/webface.log"));
        let _g7 = set_env_guard(DEBUG_ENV, Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.base_url, "http://example.org:9000");
        assert_eq!(config.mode, Mode::Forum);
        assert_eq!(
            config.resolved_state_path(Path::new("/ignored")),
            PathBuf::from("/tmp/webface.json")
        );
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_filter.as_deref(), Some("webface=trace"));
        assert_eq!(config.log_file.as_deref(), Some("/tmp/webface.log"));
        assert!(config.debug);
    }

    #[test]
    fn invalid_mode_and_seed_fall_back_with_warnings() {
        let _lock = env_lock();
        let _guards = clear_all();
        let _g1 = set_env_guard(MODE_ENV, Some("salon"));
        let _g2 = set_env_guard(SEED_ENV, Some("not-a-number"));

        let config = EnvConfig::from_env();
        assert_eq!(config.mode, Mode::Direct);
        assert!(config.seed.is_none());
        assert_eq!(config.warnings.len(), 2);
        assert!(config.warnings[0].contains(MODE_ENV));
        assert!(config.warnings[1].contains(SEED_ENV));
    }

    #[test]
    fn blank_values_are_ignored() {
        let _lock = env_lock();
        let _guards = clear_all();
        let _g1 = set_env_guard(BASE_URL_ENV, Some("   "));
        let _g2 = set_env_guard(LOG_FILE_ENV, Some(""));

        let config = EnvConfig::from_env();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert!(config.log_file.is_none());
        assert!(config.warnings.is_empty());
    }
}
