//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAIL2CHAT_CONFIG` (environment variable)
//! 2. `~/.config/mail2chat/config.toml` (Linux/macOS)
//!    `%APPDATA%\mail2chat\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Every `[[profile]]` inherits from `[default_profile]`: a field set to a
//! non-zero value in the profile wins, anything left empty, `false` or `0`
//! falls back to the default. `ignore_defaults = true` disables that.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MailError, Result};
use crate::filter::FilterSpec;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Polling behavior.
    pub general: GeneralConfig,
    /// Log output.
    pub logging: LoggingConfig,
    /// Values inherited by every profile.
    pub default_profile: Profile,
    /// The configured profiles, in file order.
    #[serde(rename = "profile")]
    pub profiles: Vec<Profile>,
}

/// Polling behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// State file remembering already forwarded messages.
    pub file: String,
    /// Seconds between two polls.
    pub time_interval: u64,
    /// Poll once and exit.
    pub no_loop: bool,
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "error", "warn", "info", "debug" or "trace".
    pub log_level: String,
    /// "text" or "json".
    pub log_type: String,
    /// Also log to this file. Empty disables file logging.
    pub log_file: String,
    /// Write before/after snapshots of HTML bodies here. Empty disables them.
    pub snapshot_dir: String,
}

/// A mail source, a filter and a chat target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Use this profile verbatim instead of merging it onto the defaults.
    pub ignore_defaults: bool,
    pub mail: MailConfig,
    pub chat: ChatConfig,
    pub filter: FilterSpec,
}

/// IMAP connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub imap_server: String,
    pub username: String,
    pub password: String,
    pub read_only: bool,
    pub imap_tls: bool,
    pub verify_tls: bool,
    /// Maximum number of messages fetched per poll.
    pub limit: u32,
}

/// Chat target and message formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub url: String,
    pub team: String,
    pub username: String,
    pub password: String,
    pub access_token: String,
    pub channels: Vec<String>,
    pub users: Vec<String>,
    pub broadcast: Vec<String>,
    pub subject_only: bool,
    pub strip_html: bool,
    pub convert_to_markdown: bool,
    pub hide_from: bool,
    pub hide_from_email: bool,
    pub hide_subject: bool,
    /// Forward attachments and inline images.
    pub mail_attachments: bool,
}

// ── Default implementations ─────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            logging: LoggingConfig::default(),
            default_profile: Profile::builtin(),
            profiles: Vec::new(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            file: "data.json".to_string(),
            time_interval: 10,
            no_loop: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_type: "text".to_string(),
            log_file: String::new(),
            snapshot_dir: String::new(),
        }
    }
}

impl Profile {
    /// Defaults used when the configuration has no `[default_profile]`.
    pub fn builtin() -> Self {
        Self {
            ignore_defaults: false,
            mail: MailConfig {
                imap_tls: true,
                verify_tls: true,
                limit: 10,
                ..MailConfig::default()
            },
            chat: ChatConfig {
                strip_html: true,
                mail_attachments: true,
                ..ChatConfig::default()
            },
            filter: FilterSpec {
                folders: vec!["INBOX".to_string()],
                unseen: true,
                ..FilterSpec::default()
            },
        }
    }
}

// ── Profile merge ───────────────────────────────────────────────

/// Take `over` unless it is the zero value of its type.
fn pick<T: Clone + Default + PartialEq>(default: &T, over: &T) -> T {
    if *over == T::default() {
        default.clone()
    } else {
        over.clone()
    }
}

/// Merge `overrides` onto `default`, field by field.
///
/// Profiles with `ignore_defaults` are returned unchanged.
pub fn merge_profile(default: &Profile, overrides: &Profile) -> Profile {
    if overrides.ignore_defaults {
        return overrides.clone();
    }

    let (dm, om) = (&default.mail, &overrides.mail);
    let (dc, oc) = (&default.chat, &overrides.chat);
    let (df, of) = (&default.filter, &overrides.filter);

    Profile {
        ignore_defaults: false,
        mail: MailConfig {
            imap_server: pick(&dm.imap_server, &om.imap_server),
            username: pick(&dm.username, &om.username),
            password: pick(&dm.password, &om.password),
            read_only: pick(&dm.read_only, &om.read_only),
            imap_tls: pick(&dm.imap_tls, &om.imap_tls),
            verify_tls: pick(&dm.verify_tls, &om.verify_tls),
            limit: pick(&dm.limit, &om.limit),
        },
        chat: ChatConfig {
            url: pick(&dc.url, &oc.url),
            team: pick(&dc.team, &oc.team),
            username: pick(&dc.username, &oc.username),
            password: pick(&dc.password, &oc.password),
            access_token: pick(&dc.access_token, &oc.access_token),
            channels: pick(&dc.channels, &oc.channels),
            users: pick(&dc.users, &oc.users),
            broadcast: pick(&dc.broadcast, &oc.broadcast),
            subject_only: pick(&dc.subject_only, &oc.subject_only),
            strip_html: pick(&dc.strip_html, &oc.strip_html),
            convert_to_markdown: pick(&dc.convert_to_markdown, &oc.convert_to_markdown),
            hide_from: pick(&dc.hide_from, &oc.hide_from),
            hide_from_email: pick(&dc.hide_from_email, &oc.hide_from_email),
            hide_subject: pick(&dc.hide_subject, &oc.hide_subject),
            mail_attachments: pick(&dc.mail_attachments, &oc.mail_attachments),
        },
        filter: FilterSpec {
            folders: pick(&df.folders, &of.folders),
            from: pick(&df.from, &of.from),
            to: pick(&df.to, &of.to),
            subject: pick(&df.subject, &of.subject),
            unseen: pick(&df.unseen, &of.unseen),
            time_range: pick(&df.time_range, &of.time_range),
        },
    }
}

impl Config {
    /// Every profile merged onto the defaults.
    ///
    /// Without any `[[profile]]` the default profile is the only one.
    pub fn resolved_profiles(&self) -> Vec<Profile> {
        if self.profiles.is_empty() {
            return vec![self.default_profile.clone()];
        }
        self.profiles
            .iter()
            .map(|p| merge_profile(&self.default_profile, p))
            .collect()
    }

    /// The resolved profile at `index`.
    pub fn profile(&self, index: usize) -> Result<Profile> {
        self.resolved_profiles()
            .into_iter()
            .nth(index)
            .ok_or(MailError::NoSuchProfile(index))
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration from `path`.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailError::FileNotFound(path.to_path_buf())
        } else {
            MailError::io(path, e)
        }
    })?;
    let config = toml::from_str::<Config>(&contents).map_err(|e| MailError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), profiles = config.profiles.len(), "Loaded config");
    Ok(config)
}

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    let Some(path) = config_file_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match load_config_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to load config, using defaults"
            );
            Config::default()
        }
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAIL2CHAT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mail2chat").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[general]
time_interval = 30

[logging]
log_level = "debug"

[default_profile.mail]
imap_server = "imap.example.com:993"
username = "bot"
imap_tls = true
limit = 10

[default_profile.chat]
url = "https://chat.example.com"
team = "ops"
channels = ["#town-square"]
strip_html = true
mail_attachments = true

[default_profile.filter]
folders = ["INBOX"]
unseen = true
time_range = "24h"

[[profile]]
[profile.filter]
subject = ["[alerts]"]
[profile.chat]
channels = ["#alerts"]

[[profile]]
ignore_defaults = true
[profile.mail]
imap_server = "other.example.com:993"
"##;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.time_interval, 10);
        assert_eq!(cfg.logging.log_level, "info");
        assert!(cfg.default_profile.chat.strip_html);
        assert_eq!(cfg.resolved_profiles().len(), 1);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: Config = toml::from_str(SAMPLE).expect("parse");
        assert_eq!(cfg.general.time_interval, 30);
        assert_eq!(cfg.general.file, "data.json");
        assert_eq!(cfg.logging.log_level, "debug");
        assert_eq!(cfg.logging.log_type, "text");
        assert_eq!(cfg.profiles.len(), 2);
    }

    #[test]
    fn test_merge_fills_zero_fields() {
        let cfg: Config = toml::from_str(SAMPLE).expect("parse");
        let resolved = cfg.resolved_profiles();

        let alerts = &resolved[0];
        assert_eq!(alerts.mail.imap_server, "imap.example.com:993");
        assert_eq!(alerts.mail.limit, 10);
        assert_eq!(alerts.chat.team, "ops");
        assert_eq!(alerts.chat.channels, vec!["#alerts"]);
        assert_eq!(alerts.filter.subject, vec!["[alerts]"]);
        assert_eq!(alerts.filter.time_range.as_deref(), Some("24h"));
        assert!(alerts.chat.mail_attachments);
    }

    #[test]
    fn test_ignore_defaults_is_verbatim() {
        let cfg: Config = toml::from_str(SAMPLE).expect("parse");
        let standalone = cfg.profile(1).expect("profile");
        assert_eq!(standalone.mail.imap_server, "other.example.com:993");
        assert!(standalone.mail.username.is_empty());
        assert!(standalone.filter.time_range.is_none());
        assert!(!standalone.chat.mail_attachments);
    }

    #[test]
    fn test_false_cannot_override_true() {
        let default = Profile::builtin();
        let mut overrides = Profile::default();
        overrides.chat.strip_html = false;
        assert!(merge_profile(&default, &overrides).chat.strip_html);
    }

    #[test]
    fn test_missing_profile_index() {
        let cfg = Config::default();
        assert!(matches!(cfg.profile(3), Err(MailError::NoSuchProfile(3))));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).expect("write");
        let cfg = load_config_from(&path).expect("load");
        assert_eq!(cfg.profiles.len(), 2);
    }

    #[test]
    fn test_load_config_from_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general\ntime_interval = ").expect("write");
        assert!(matches!(
            load_config_from(&path),
            Err(MailError::Config { .. })
        ));
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg: Config = toml::from_str(SAMPLE).expect("parse");
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.profiles, cfg.profiles);
        assert_eq!(parsed.default_profile, cfg.default_profile);
    }
}
