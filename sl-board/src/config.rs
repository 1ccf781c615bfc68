//! Startup configuration.
//!
//! Read from a TOML file whose path comes from `SL_BOARD_CONFIG`
//! (default `sl-board.toml`). `SL_API_KEY` overrides the file's key.
//!
//! ```toml
//! api_key = "..."
//! tick_interval_secs = 30
//! bind = "127.0.0.1:3000"
//! now_token = "Nu"
//!
//! [[sites]]
//! site_id = "9192"
//! time_window = 60
//! min_interval_secs = 60
//! enabled_flag = "/run/sl-board/enabled"
//!
//! [[sites.groups]]
//! name = "slussen-metro-north"
//! lines = ["13", "14"]
//! directions = [1]
//! ```

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::board::GroupConfig;
use crate::domain::{DEFAULT_NOW_TOKEN, InvalidSiteId, SiteId};
use crate::engine::SiteSpec;
use crate::fetch::SiteFetchState;
use crate::gate::FlagFileGate;

pub const CONFIG_PATH_VAR: &str = "SL_BOARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "sl-board.toml";
pub const API_KEY_VAR: &str = "SL_API_KEY";
pub const MOCK_DIR_VAR: &str = "SL_MOCK_DIR";

/// Why a configuration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no sites configured")]
    NoSites,

    #[error(transparent)]
    InvalidSiteId(#[from] InvalidSiteId),

    #[error("site {0} is configured more than once")]
    DuplicateSite(SiteId),

    #[error("group name {0:?} is used more than once")]
    DuplicateGroup(String),

    #[error("group {group:?}: direction 0 is not a valid filter")]
    InvalidDirection { group: String },

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: String },

    #[error("invalid bind address {0:?}")]
    InvalidBind(String),

    #[error("now_token must not be empty")]
    EmptyNowToken,

    #[error("no API key: set SL_API_KEY or api_key in the config file")]
    MissingApiKey,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    api_key: Option<String>,
    #[serde(default = "default_tick_interval_secs")]
    tick_interval_secs: u64,
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_now_token")]
    now_token: String,
    #[serde(default)]
    sites: Vec<RawSite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSite {
    site_id: String,
    time_window: Option<u16>,
    #[serde(default = "default_min_interval_secs")]
    min_interval_secs: u64,
    enabled_flag: Option<PathBuf>,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    name: String,
    #[serde(default)]
    lines: Vec<String>,
    #[serde(default)]
    directions: Vec<u8>,
}

fn default_tick_interval_secs() -> u64 {
    30
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_now_token() -> String {
    DEFAULT_NOW_TOKEN.to_string()
}

fn default_min_interval_secs() -> u64 {
    60
}

/// One monitored site.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site: SiteId,
    pub time_window: Option<u16>,
    pub min_interval: chrono::Duration,
    pub enabled_flag: Option<PathBuf>,
    /// Never empty: a site with no groups gets `raw-<site>`.
    pub groups: Vec<GroupConfig>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub tick_interval: Duration,
    pub bind: SocketAddr,
    pub now_token: String,
    pub sites: Vec<SiteConfig>,
}

impl Config {
    /// Load from `SL_BOARD_CONFIG` (or the default path), then apply `SL_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let config = Self::load(path)?;
        Ok(config.with_api_key_override(std::env::var(API_KEY_VAR).ok()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse()
    }

    /// Replace the API key if `key` is set and non-empty.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// The API key, required for the live client.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Engine input for every configured site.
    pub fn site_specs(&self) -> Vec<SiteSpec> {
        self.sites
            .iter()
            .map(|site| {
                let mut state = SiteFetchState::new(site.site, site.min_interval);
                if let Some(minutes) = site.time_window {
                    state = state.with_time_window(minutes);
                }

                let mut spec = SiteSpec::new(state);
                for group in &site.groups {
                    spec = spec.with_group(group.clone());
                }
                if let Some(path) = &site.enabled_flag {
                    spec = spec.with_gate(Arc::new(FlagFileGate::new(path)));
                }
                spec
            })
            .collect()
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawConfig = toml::from_str(s)?;
        validate(raw)
    }
}

fn validate(raw: RawConfig) -> Result<Config, ConfigError> {
    if raw.sites.is_empty() {
        return Err(ConfigError::NoSites);
    }
    if raw.tick_interval_secs == 0 {
        return Err(ConfigError::ZeroInterval {
            field: "tick_interval_secs".into(),
        });
    }
    if raw.now_token.trim().is_empty() {
        return Err(ConfigError::EmptyNowToken);
    }
    let bind = raw
        .bind
        .parse::<SocketAddr>()
        .map_err(|_| ConfigError::InvalidBind(raw.bind.clone()))?;

    let mut names = BTreeSet::new();
    let mut seen_sites = BTreeSet::new();
    let mut sites = Vec::with_capacity(raw.sites.len());

    for raw_site in raw.sites {
        let site = SiteId::parse(&raw_site.site_id)?;
        if !seen_sites.insert(site) {
            return Err(ConfigError::DuplicateSite(site));
        }

        if raw_site.min_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval {
                field: format!("sites[{site}].min_interval_secs"),
            });
        }
        if raw_site.time_window == Some(0) {
            return Err(ConfigError::ZeroInterval {
                field: format!("sites[{site}].time_window"),
            });
        }
        let secs = u32::try_from(raw_site.min_interval_secs).unwrap_or(u32::MAX);
        let min_interval = chrono::Duration::seconds(i64::from(secs));

        let mut groups = Vec::new();
        for raw_group in raw_site.groups {
            if raw_group.directions.contains(&0) {
                return Err(ConfigError::InvalidDirection {
                    group: raw_group.name,
                });
            }
            groups.push(
                GroupConfig::new(raw_group.name, site)
                    .with_lines(raw_group.lines)
                    .with_directions(raw_group.directions),
            );
        }
        if groups.is_empty() {
            groups.push(GroupConfig::raw(site));
        }

        for group in &groups {
            if !names.insert(group.name.clone()) {
                return Err(ConfigError::DuplicateGroup(group.name.clone()));
            }
        }

        sites.push(SiteConfig {
            site,
            time_window: raw_site.time_window,
            min_interval,
            enabled_flag: raw_site.enabled_flag,
            groups,
        });
    }

    Ok(Config {
        api_key: raw.api_key.filter(|k| !k.trim().is_empty()),
        tick_interval: Duration::from_secs(raw.tick_interval_secs),
        bind,
        now_token: raw.now_token,
        sites,
    })
}
