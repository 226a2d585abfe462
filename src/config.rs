// 9.0 config.rs: all game settings in one place. ruleset, urls, forum limits.
// 9.1 from_env reads FPL_* overrides on top of a preset.
//
// Environment variables (all optional):
//   FPL_RULESET         six_a_side | five_a_side (default six_a_side)
//   FPL_BUDGET_CEILING  decimal ceiling, e.g. 50.0
//   FPL_BASE_URL        used to build claim urls (default http://localhost:3000)
//   FPL_ADMIN_KEY       secret required to trigger a gameweek through the api

use crate::formation::{Formation, Ruleset};
use crate::types::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesetPreset {
    SixASide,
    FiveASide,
}

impl RulesetPreset {
    pub fn ruleset(&self) -> Ruleset {
        match self {
            RulesetPreset::SixASide => Ruleset::six_a_side(),
            RulesetPreset::FiveASide => Ruleset::five_a_side(),
        }
    }
}

impl FromStr for RulesetPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "six_a_side" | "6" => Ok(RulesetPreset::SixASide),
            "five_a_side" | "5" => Ok(RulesetPreset::FiveASide),
            other => Err(ConfigError::InvalidEnv {
                var: "FPL_RULESET",
                value: other.to_string(),
            }),
        }
    }
}

/** 9.2: the complete game configuration */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub ruleset: Ruleset,
    // prefix for claim urls handed out at registration
    pub base_url: String,
    // gameweek trigger secret. None disables the trigger through the api
    pub admin_key: Option<String>,
    pub max_post_len: usize,
    pub post_page_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ruleset: Ruleset::six_a_side(),
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_key: None,
            max_post_len: 500,
            post_page_size: 50,
        }
    }
}

impl GameConfig {
    pub fn five_a_side() -> Self {
        Self {
            ruleset: Ruleset::five_a_side(),
            ..Self::default()
        }
    }

    pub fn with_admin_key(mut self, key: impl Into<String>) -> Self {
        self.admin_key = Some(key.into());
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    // split out so tests don't have to touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(preset) = lookup("FPL_RULESET") {
            config.ruleset = preset.parse::<RulesetPreset>()?.ruleset();
        }
        if let Some(ceiling) = lookup("FPL_BUDGET_CEILING") {
            let value = Decimal::from_str(ceiling.trim()).map_err(|_| ConfigError::InvalidEnv {
                var: "FPL_BUDGET_CEILING",
                value: ceiling.clone(),
            })?;
            config.ruleset.budget_ceiling = Money::new(value);
        }
        if let Some(url) = lookup("FPL_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config.admin_key = lookup("FPL_ADMIN_KEY").filter(|k| !k.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ruleset.squad_size() == 0 {
            return Err(ConfigError::InvalidFormation {
                reason: "formation requires no players".to_string(),
            });
        }
        if self.ruleset.budget_ceiling.value() <= Decimal::ZERO {
            return Err(ConfigError::InvalidBudget {
                ceiling: self.ruleset.budget_ceiling,
            });
        }
        if self.max_post_len == 0 || self.post_page_size == 0 {
            return Err(ConfigError::InvalidForum {
                reason: "post length and page size must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn formation(&self) -> &Formation {
        &self.ruleset.formation
    }

    pub fn claim_url(&self, token: &str) -> String {
        format!("{}/claim/{token}", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid formation: {reason}")]
    InvalidFormation { reason: String },

    #[error("Budget ceiling must be positive, got {ceiling}")]
    InvalidBudget { ceiling: Money },

    #[error("Invalid forum settings: {reason}")]
    InvalidForum { reason: String },

    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
}
