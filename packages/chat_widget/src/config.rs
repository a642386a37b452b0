use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::WidgetError;
use crate::history::RetryPolicy;

// =============================================================================
// Unified config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
// Two equivalent ways to configure:
//
//   config.toml:     [transport]
//                    organization_id = "org-123"
//
//   env var:         WIDGET_TRANSPORT__ORGANIZATION_ID=org-123
//                    (double underscore = nesting)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub transport: TransportFileConfig,
    #[serde(default)]
    pub notify: NotifyFileConfig,
    #[serde(default)]
    pub theme: ThemeFileConfig,
    #[serde(default)]
    pub history: HistoryFileConfig,
}

/// Vendor connection identifiers (lives under `[transport]` in config.toml).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransportFileConfig {
    #[serde(default)]
    pub organization_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub group_id: Option<u32>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Backend notification endpoint (lives under `[notify]` in config.toml).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NotifyFileConfig {
    /// POST target hit after each confirmed customer message. Empty disables.
    #[serde(default)]
    pub url: Option<String>,
}

/// Host-page presentation knobs (lives under `[theme]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeFileConfig {
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_position_bottom")]
    pub position_bottom: String,
    #[serde(default = "default_position_right")]
    pub position_right: String,
}

impl Default for ThemeFileConfig {
    fn default() -> Self {
        Self {
            primary_color: default_primary_color(),
            title: default_title(),
            position_bottom: default_position_bottom(),
            position_right: default_position_right(),
        }
    }
}

/// History loading tunables (lives under `[history]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryFileConfig {
    /// Total attempts for the initial history load after connecting.
    #[serde(default = "default_initial_load_attempts")]
    pub initial_load_attempts: u32,
}

impl Default for HistoryFileConfig {
    fn default() -> Self {
        Self {
            initial_load_attempts: default_initial_load_attempts(),
        }
    }
}

fn default_primary_color() -> String {
    "#212B58".to_string()
}
fn default_title() -> String {
    "Live Chat".to_string()
}
fn default_position_bottom() -> String {
    "96px".to_string()
}
fn default_position_right() -> String {
    "24px".to_string()
}
fn default_initial_load_attempts() -> u32 {
    2
}

/// Build a figment that layers: defaults → config.toml → WIDGET_* env vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `WIDGET_TRANSPORT__ORGANIZATION_ID=org-1` → `transport.organization_id`
///   `WIDGET_NOTIFY__URL=https://...`          → `notify.url`
pub fn load_config(dir: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(dir.join("config.toml")))
        .merge(Env::prefixed("WIDGET_").split("__"))
}

// =============================================================================
// Runtime config (derived from FileConfig, used by the reconciler)
// =============================================================================

#[derive(Clone, Debug)]
pub struct WidgetConfig {
    pub organization_id: String,
    pub client_id: String,
    pub group_id: Option<u32>,
    pub region: Option<String>,
    pub notify_url: Option<String>,
    pub theme: ThemeFileConfig,
    pub history_retry: RetryPolicy,
}

impl WidgetConfig {
    pub fn from_file(fc: &FileConfig) -> Result<Self, WidgetError> {
        if fc.transport.organization_id.is_empty() {
            return Err(WidgetError::Config(
                "transport.organization_id must be set".to_string(),
            ));
        }
        if fc.transport.client_id.is_empty() {
            return Err(WidgetError::Config(
                "transport.client_id must be set".to_string(),
            ));
        }
        Ok(Self {
            organization_id: fc.transport.organization_id.clone(),
            client_id: fc.transport.client_id.clone(),
            group_id: fc.transport.group_id,
            region: fc.transport.region.clone(),
            notify_url: fc.notify.url.clone().filter(|u| !u.is_empty()),
            theme: fc.theme.clone(),
            history_retry: RetryPolicy {
                attempts: fc.history.initial_load_attempts,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_file_config() -> FileConfig {
        FileConfig {
            transport: TransportFileConfig {
                organization_id: "org-1".to_string(),
                client_id: "client-1".to_string(),
                group_id: None,
                region: None,
            },
            ..Default::default()
        }
    }

    // ── defaults ────────────────────────────────────────────────────────

    #[test]
    fn test_theme_defaults() {
        let d = ThemeFileConfig::default();
        assert_eq!(d.primary_color, "#212B58");
        assert_eq!(d.title, "Live Chat");
        assert_eq!(d.position_bottom, "96px");
        assert_eq!(d.position_right, "24px");
    }

    #[test]
    fn test_history_defaults() {
        assert_eq!(HistoryFileConfig::default().initial_load_attempts, 2);
    }

    // ── WidgetConfig::from_file ─────────────────────────────────────────

    #[test]
    fn test_from_file_valid() {
        let config = WidgetConfig::from_file(&valid_file_config()).unwrap();
        assert_eq!(config.organization_id, "org-1");
        assert_eq!(config.client_id, "client-1");
        assert!(config.notify_url.is_none());
        assert_eq!(config.history_retry.attempts, 2);
    }

    #[test]
    fn test_from_file_rejects_missing_organization() {
        let mut fc = valid_file_config();
        fc.transport.organization_id.clear();
        let err = WidgetConfig::from_file(&fc).unwrap_err();
        assert!(matches!(err, WidgetError::Config(_)));
    }

    #[test]
    fn test_from_file_rejects_missing_client() {
        let mut fc = valid_file_config();
        fc.transport.client_id.clear();
        let err = WidgetConfig::from_file(&fc).unwrap_err();
        assert!(matches!(err, WidgetError::Config(_)));
    }

    #[test]
    fn test_from_file_blank_notify_url_disables() {
        let mut fc = valid_file_config();
        fc.notify.url = Some(String::new());
        let config = WidgetConfig::from_file(&fc).unwrap();
        assert!(config.notify_url.is_none());
    }

    // ── load_config ─────────────────────────────────────────────────────

    #[test]
    fn test_load_config_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let fc: FileConfig = load_config(tmp.path()).extract().unwrap();
        assert!(fc.transport.organization_id.is_empty());
        assert_eq!(fc.theme.title, "Live Chat");
        assert_eq!(fc.history.initial_load_attempts, 2);
    }

    #[test]
    fn test_load_config_toml_sets_values() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            concat!(
                "[transport]\n",
                "organization_id = \"org-9\"\n",
                "client_id = \"client-9\"\n",
                "group_id = 4\n",
                "[notify]\n",
                "url = \"https://backend.example/api/chat\"\n",
                "[history]\n",
                "initial_load_attempts = 3\n",
            ),
        )
        .unwrap();
        let fc: FileConfig = load_config(tmp.path()).extract().unwrap();
        assert_eq!(fc.transport.organization_id, "org-9");
        assert_eq!(fc.transport.group_id, Some(4));
        assert_eq!(
            fc.notify.url.as_deref(),
            Some("https://backend.example/api/chat")
        );
        assert_eq!(fc.history.initial_load_attempts, 3);
    }

    #[test]
    fn test_load_config_toml_theme_override() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[theme]\ntitle = \"Support\"\n",
        )
        .unwrap();
        let fc: FileConfig = load_config(tmp.path()).extract().unwrap();
        assert_eq!(fc.theme.title, "Support");
        // untouched fields keep their defaults
        assert_eq!(fc.theme.primary_color, "#212B58");
    }
}
