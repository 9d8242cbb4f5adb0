use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_encore_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", "/tmp/encore-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/encore-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("encore")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("encore")
            .join("config.toml")
    );
}

#[test]
fn defaults_target_the_itunes_store_and_validate() {
    let s = Settings::default();
    assert_eq!(s.search.endpoint, "https://itunes.apple.com/search");
    assert_eq!(s.search.country, "ID");
    assert!(!s.search.discard_stale_results);
    assert_eq!(s.playback.progress_interval_ms, 1000);
    assert!(s.logging.file.is_none());
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[search]
endpoint = "http://localhost:8080/search"
country = "US"
timeout_secs = 3
discard_stale_results = true

[playback]
progress_interval_ms = 250

[controls]
scrub_seconds = 9

[ui]
header_text = "hello"
empty_text = "nothing yet"
now_playing_separator = " • "

[logging]
filter = "encore=debug"
file = "/tmp/encore.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ENCORE__SEARCH__COUNTRY");

    let s = Settings::load().unwrap();
    assert_eq!(s.search.endpoint, "http://localhost:8080/search");
    assert_eq!(s.search.country, "US");
    assert_eq!(s.search.timeout_secs, 3);
    assert!(s.search.discard_stale_results);
    assert_eq!(s.playback.progress_interval_ms, 250);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.empty_text, "nothing yet");
    assert_eq!(s.ui.now_playing_separator, " • ");
    assert_eq!(s.logging.filter, "encore=debug");
    assert_eq!(
        s.logging.file.as_deref(),
        Some(std::path::Path::new("/tmp/encore.log"))
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[search]
country = "US"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ENCORE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("ENCORE__SEARCH__COUNTRY", "JP");

    let s = Settings::load().unwrap();
    assert_eq!(s.search.country, "JP");
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "ENCORE_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );
    let _g2 = EnvGuard::remove("ENCORE__SEARCH__COUNTRY");

    let s = Settings::load().unwrap();
    assert_eq!(s.search.country, "ID");
    assert_eq!(s.controls.scrub_seconds, 5);
}

#[test]
fn partial_sections_keep_field_defaults() {
    let s: Settings = toml::from_str(
        r#"
[search]
country = "GB"
"#,
    )
    .unwrap();
    assert_eq!(s.search.country, "GB");
    assert_eq!(s.search.endpoint, "https://itunes.apple.com/search");
    assert_eq!(s.search.timeout_secs, 15);
    assert_eq!(s.ui.empty_text, "Find your favorite music and enjoy");
}

#[test]
fn validate_rejects_unusable_values() {
    let mut s = Settings::default();
    s.search.endpoint = "  ".to_string();
    assert!(s.validate().unwrap_err().contains("search.endpoint"));

    let mut s = Settings::default();
    s.search.country.clear();
    assert!(s.validate().unwrap_err().contains("search.country"));

    let mut s = Settings::default();
    s.search.timeout_secs = 0;
    assert!(s.validate().unwrap_err().contains("timeout_secs"));

    let mut s = Settings::default();
    s.playback.progress_interval_ms = 0;
    assert!(s.validate().unwrap_err().contains("progress_interval_ms"));
}
