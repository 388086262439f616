//! Navigation preferences (`slotnav.toml`).
//!
//! Every field has a default, so an empty file is a valid configuration.
//! The controller holds one [`NavConfig`] and replaces it wholesale when
//! preferences change.

use std::path::Path;

use serde::Deserialize;

use crate::error::{NavError, Result};
use crate::location::Location;

/// Where a newly opened tab is placed within its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NewTabPosition {
    /// Directly after the active slot.
    #[default]
    AfterCurrent,
    /// After the last slot of the window.
    End,
}

/// User-facing navigation preferences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavConfig {
    /// View used when a location carries no per-location preference.
    #[serde(default = "default_view")]
    pub default_view: String,
    /// View forced in desktop windows.
    #[serde(default = "default_desktop_view")]
    pub desktop_view: String,
    /// Home location; fallback target for failed first loads.
    #[serde(default = "default_home")]
    pub home: String,
    /// Filesystem root; fallback target when home itself failed.
    #[serde(default = "default_root")]
    pub root: String,
    /// Open folders in navigation windows instead of spatial ones.
    #[serde(default = "yes")]
    pub always_use_browser: bool,
    /// Whether directory-change notification is available. When false every
    /// transition forces a reload of the target.
    #[serde(default = "yes")]
    pub monitor_active: bool,
    #[serde(default)]
    pub new_tab_position: NewTabPosition,
    /// URIs longer than this are middle-truncated in failure reports.
    #[serde(default = "default_max_uri")]
    pub max_uri_in_dialog: usize,
}

fn default_view() -> String {
    "icon-view".to_string()
}
fn default_desktop_view() -> String {
    "desktop-icon-view".to_string()
}
fn default_home() -> String {
    "/home/user".to_string()
}
fn default_root() -> String {
    "/".to_string()
}
fn yes() -> bool {
    true
}
fn default_max_uri() -> usize {
    60
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            default_view: default_view(),
            desktop_view: default_desktop_view(),
            home: default_home(),
            root: default_root(),
            always_use_browser: true,
            monitor_active: true,
            new_tab_position: NewTabPosition::default(),
            max_uri_in_dialog: default_max_uri(),
        }
    }
}

impl NavConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: NavConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded navigation config from {}", path.display());
        Ok(config)
    }

    /// Parsed home location.
    pub fn home_location(&self) -> Result<Location> {
        Location::parse(&self.home)
    }

    /// Parsed root location.
    pub fn root_location(&self) -> Result<Location> {
        Location::parse(&self.root)
    }

    fn validate(&self) -> Result<()> {
        if self.default_view.is_empty() {
            return Err(NavError::Config("default_view must not be empty".into()));
        }
        if self.desktop_view.is_empty() {
            return Err(NavError::Config("desktop_view must not be empty".into()));
        }
        self.home_location()
            .map_err(|e| NavError::Config(format!("home: {e}")))?;
        self.root_location()
            .map_err(|e| NavError::Config(format!("root: {e}")))?;
        if self.max_uri_in_dialog < 5 {
            return Err(NavError::Config(
                "max_uri_in_dialog must be at least 5".into(),
            ));
        }
        Ok(())
    }
}
