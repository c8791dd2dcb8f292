use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::calendar::Clock;
use crate::listing::ListQuery;
use crate::notify::Toasts;

const DEFAULT_TOAST_TTL_SECS: u64   = 5;
const DEFAULT_MAX_TOASTS:     usize = 3;
const DEFAULT_DEBOUNCE_MS:    u64   = 500;
const DEFAULT_PAGE_SIZE:      u32   = 20;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub calendar:      Option<CalendarConfig>,
    pub notifications: Option<NotificationConfig>,
    pub listing:       Option<ListingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarConfig {
    /// "local" | "utc"; decides which day counts as today.
    pub clock: Option<Clock>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationConfig {
    pub ttl_seconds: Option<u64>,
    pub max_visible: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ListingConfig {
    pub debounce_ms: Option<u64>,
    pub page_size:   Option<u32>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_toml_str(&std::fs::read_to_string(path)?)
        } else {
            Ok(AppConfig::default())
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    // ── Resolved settings ─────────────────────────────────────────────────────

    pub fn clock(&self) -> Clock {
        self.calendar.as_ref().and_then(|c| c.clock).unwrap_or_default()
    }

    pub fn notification_ttl(&self) -> Duration {
        let secs = self.notifications.as_ref().and_then(|n| n.ttl_seconds);
        Duration::from_secs(secs.unwrap_or(DEFAULT_TOAST_TTL_SECS))
    }

    pub fn max_visible_toasts(&self) -> usize {
        self.notifications.as_ref().and_then(|n| n.max_visible)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_TOASTS)
    }

    pub fn search_debounce(&self) -> Duration {
        let ms = self.listing.as_ref().and_then(|l| l.debounce_ms);
        Duration::from_millis(ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    pub fn page_size(&self) -> u32 {
        match self.listing.as_ref().and_then(|l| l.page_size) {
            Some(0) => {
                warn!("listing.page_size = 0 is invalid, using {DEFAULT_PAGE_SIZE}");
                DEFAULT_PAGE_SIZE
            }
            Some(n) => n,
            None    => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn toasts(&self) -> Toasts {
        Toasts::new(self.notification_ttl(), self.max_visible_toasts())
    }

    pub fn list_query(&self) -> ListQuery {
        ListQuery::new(self.search_debounce(), self.page_size())
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nursery-admin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.clock(), Clock::Local);
        assert_eq!(cfg.notification_ttl(), Duration::from_secs(5));
        assert_eq!(cfg.max_visible_toasts(), 3);
        assert_eq!(cfg.search_debounce(), Duration::from_millis(500));
        assert_eq!(cfg.page_size(), 20);
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = AppConfig::from_toml_str(r#"
            [calendar]
            clock = "utc"

            [notifications]
            ttl_seconds = 10
            max_visible = 1

            [listing]
            debounce_ms = 250
            page_size   = 50
        "#).unwrap();
        assert_eq!(cfg.clock(), Clock::Utc);
        assert_eq!(cfg.notification_ttl(), Duration::from_secs(10));
        assert_eq!(cfg.max_visible_toasts(), 1);
        assert_eq!(cfg.search_debounce(), Duration::from_millis(250));
        assert_eq!(cfg.list_query().params().page_size, 50);
    }

    #[test]
    fn zero_page_size_falls_back() {
        let cfg = AppConfig::from_toml_str("[listing]\npage_size = 0\n").unwrap();
        assert_eq!(cfg.page_size(), 20);
    }

    #[test]
    fn unknown_clock_is_an_error() {
        assert!(AppConfig::from_toml_str("[calendar]\nclock = \"mars\"\n").is_err());
    }

    #[test]
    fn loads_from_file_and_tolerates_missing_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(AppConfig::load_from(&path).unwrap().calendar.is_none());

        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[notifications]\nttl_seconds = 2").unwrap();
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.notification_ttl(), Duration::from_secs(2));
    }
}
