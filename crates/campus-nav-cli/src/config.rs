//! CLI configuration from environment.

use anyhow::{Context, Result};
use campus_nav_core::NavigationRules;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Network snapshot used when `--network` is not given
    pub network_path: Option<PathBuf>,
    /// JSON file with `NavigationRules` overrides
    pub rules_path: Option<PathBuf>,
    pub walking_speed_mps: Option<f64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            network_path: env::var("CAMPUS_NAV_NETWORK").ok().map(PathBuf::from),
            rules_path: env::var("CAMPUS_NAV_RULES").ok().map(PathBuf::from),
            walking_speed_mps: env::var("CAMPUS_NAV_WALKING_SPEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|speed: &f64| speed.is_finite() && *speed > 0.0),
        }
    }

    /// Load rules from `rules_path` (if any) and apply environment overrides.
    pub fn rules(&self) -> Result<NavigationRules> {
        let mut rules = match &self.rules_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading rules file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing rules file {}", path.display()))?
            }
            None => NavigationRules::default(),
        };
        if let Some(speed) = self.walking_speed_mps {
            rules.walking_speed_mps = speed;
        }
        Ok(rules)
    }
}
