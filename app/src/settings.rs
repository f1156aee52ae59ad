//! Shell settings loaded from the environment.
//!
//! These control the process itself and are never persisted. The
//! user-facing notification configuration lives in the backend store.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

use clip_core::poller::POLL_INTERVAL;

const MIN_POLL_INTERVAL_MS: u64 = 100;
const MAX_POLL_INTERVAL_MS: u64 = 10_000;
const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub locale: String,
    pub poll_interval: Duration,
    /// Raw stored configuration to start from, if any.
    pub initial_config: Option<Value>,
    /// Directory searched by the `pick` command.
    pub image_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.into(),
            poll_interval: POLL_INTERVAL,
            initial_config: None,
            image_dir: PathBuf::from("."),
        }
    }
}

impl AppSettings {
    /// Load settings from process environment variables.
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let g = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let locale = g("CLIP_POP_LOCALE")
            .or_else(|| g("LANG").map(|lang| strip_encoding(&lang)))
            .filter(|code| !code.is_empty() && code != "C" && code != "POSIX")
            .unwrap_or_else(|| DEFAULT_LOCALE.into());

        let poll_interval = g("CLIP_POP_POLL_INTERVAL_MS")
            .map(|v| parse_interval(&v))
            .unwrap_or(POLL_INTERVAL);

        let initial_config = g("CLIP_POP_INITIAL_CONFIG")
            .map(|raw| serde_json::from_str::<Value>(&raw))
            .transpose()
            .context("CLIP_POP_INITIAL_CONFIG is not valid JSON")?;

        let image_dir = g("CLIP_POP_IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            locale,
            poll_interval,
            initial_config,
            image_dir,
        })
    }
}

/// `ja_JP.UTF-8` → `ja_JP`
fn strip_encoding(lang: &str) -> String {
    lang.split(['.', '@']).next().unwrap_or_default().to_string()
}

fn parse_interval(s: &str) -> Duration {
    match s.trim().parse::<u64>() {
        Ok(ms) => Duration::from_millis(ms.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS)),
        Err(_) => {
            tracing::warn!("Invalid CLIP_POP_POLL_INTERVAL_MS '{s}', using default");
            POLL_INTERVAL
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppSettings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(load(&[]).unwrap(), AppSettings::default());
    }

    #[test]
    fn test_locale_priority() {
        let s = load(&[("CLIP_POP_LOCALE", "ja-JP"), ("LANG", "de_DE.UTF-8")]).unwrap();
        assert_eq!(s.locale, "ja-JP");

        let s = load(&[("LANG", "de_DE.UTF-8")]).unwrap();
        assert_eq!(s.locale, "de_DE");

        let s = load(&[("LANG", "C.UTF-8")]).unwrap();
        assert_eq!(s.locale, "en");
    }

    #[test]
    fn test_poll_interval_clamped() {
        let s = load(&[("CLIP_POP_POLL_INTERVAL_MS", "5")]).unwrap();
        assert_eq!(s.poll_interval, Duration::from_millis(100));

        let s = load(&[("CLIP_POP_POLL_INTERVAL_MS", "60000")]).unwrap();
        assert_eq!(s.poll_interval, Duration::from_millis(10_000));

        let s = load(&[("CLIP_POP_POLL_INTERVAL_MS", "fast")]).unwrap();
        assert_eq!(s.poll_interval, POLL_INTERVAL);
    }

    #[test]
    fn test_initial_config() {
        let s = load(&[("CLIP_POP_INITIAL_CONFIG", r#"{"theme":"light"}"#)]).unwrap();
        assert_eq!(s.initial_config, Some(serde_json::json!({"theme": "light"})));

        assert!(load(&[("CLIP_POP_INITIAL_CONFIG", "{theme")]).is_err());
    }

    #[test]
    fn test_image_dir() {
        let s = load(&[("CLIP_POP_IMAGE_DIR", "/tmp/pics")]).unwrap();
        assert_eq!(s.image_dir, PathBuf::from("/tmp/pics"));
    }
}
