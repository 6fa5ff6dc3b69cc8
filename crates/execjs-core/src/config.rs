use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the preferred runtime.
pub const RUNTIME_ENV: &str = "EXECJS_RUNTIME";

/// Host settings shared by external runtimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory relative candidate paths resolve against.
    pub cwd: PathBuf,

    /// Replacement for `PATH` when resolving interpreter binaries.
    pub search_path: Option<OsString>,

    /// Directory for temporary script files (OS temp dir when unset).
    pub temp_dir: Option<PathBuf>,

    /// Preferred runtime name.
    pub runtime: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            search_path: None,
            temp_dir: None,
            runtime: None,
        }
    }
}

impl Config {
    /// Defaults plus the runtime named by `EXECJS_RUNTIME`.
    #[must_use]
    pub fn from_env() -> Self {
        let runtime = std::env::var(RUNTIME_ENV)
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Self {
            runtime,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// Search path to resolve binaries on: the override, else `PATH`.
    #[must_use]
    pub fn effective_search_path(&self) -> Option<OsString> {
        self.search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
    }

    #[must_use]
    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_reads_runtime() {
        std::env::set_var(RUNTIME_ENV, " Node.js (V8) ");
        assert_eq!(Config::from_env().runtime.as_deref(), Some("Node.js (V8)"));

        std::env::set_var(RUNTIME_ENV, "");
        assert!(Config::from_env().runtime.is_none());

        std::env::remove_var(RUNTIME_ENV);
        assert!(Config::from_env().runtime.is_none());
    }

    #[test]
    fn test_search_path_override() {
        let config = Config::default().with_search_path("/opt/js/bin");
        assert_eq!(
            config.effective_search_path(),
            Some(OsString::from("/opt/js/bin"))
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = Config::default()
            .with_temp_dir("/tmp/execjs")
            .with_runtime("SpiderMonkey");
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.temp_dir(), Some(Path::new("/tmp/execjs")));
        assert_eq!(back.runtime.as_deref(), Some("SpiderMonkey"));
    }
}
