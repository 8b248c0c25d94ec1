use std::fs;

use gnosis::soup::{SoupConfig, SoupOverrides, Variant};
use gnosis::Difficulty;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::paths::AppPaths;

fn default_quiz_rounds() -> Option<u32> {
    Some(10)
}

/// Contents of `config.json`. Every field is optional on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Fixed seed for reproducible boards; random per run when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Correct answers needed to finish a quiz; `null` for endless.
    #[serde(default = "default_quiz_rounds")]
    pub quiz_rounds: Option<u32>,
    #[serde(default)]
    pub pair_addition: SoupOverrides,
    #[serde(default)]
    pub pair_subtraction: SoupOverrides,
    #[serde(default)]
    pub advanced_easy: SoupOverrides,
    #[serde(default)]
    pub advanced_medium: SoupOverrides,
    #[serde(default)]
    pub advanced_hard: SoupOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            quiz_rounds: default_quiz_rounds(),
            pair_addition: SoupOverrides::default(),
            pair_subtraction: SoupOverrides::default(),
            advanced_easy: SoupOverrides::default(),
            advanced_medium: SoupOverrides::default(),
            advanced_hard: SoupOverrides::default(),
        }
    }
}

impl Settings {
    /// Read `config.json` (absent means defaults), then apply `GNOSIS_SEED`.
    pub fn load(paths: &AppPaths) -> Result<Self, AppError> {
        let path = paths.config_file();
        let mut settings = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            Self::from_json(&raw)?
        } else {
            Self::default()
        };

        // GNOSIS_SEED=1234
        if let Ok(v) = std::env::var("GNOSIS_SEED") {
            match v.trim().parse::<u64>() {
                Ok(n) => settings.seed = Some(n),
                Err(_) => warn!("Ignoring unparseable GNOSIS_SEED value: {}", v),
            }
        }

        Ok(settings)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    pub fn soup_config(&self, variant: Variant) -> SoupConfig {
        let overrides = match variant {
            Variant::PairAddition => &self.pair_addition,
            Variant::PairSubtraction => &self.pair_subtraction,
            Variant::Advanced(Difficulty::Easy) => &self.advanced_easy,
            Variant::Advanced(Difficulty::Medium) => &self.advanced_medium,
            Variant::Advanced(Difficulty::Hard) => &self.advanced_hard,
        };
        overrides.apply(variant.config())
    }
}
