use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::BOARD_SIZE;

/// Rule constants for one match. Immutable once the game is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub max_rounds: u32,
    pub starting_money: i64,
    pub start_pass_money: i64,
    pub jail_position: usize,
    pub jail_bail: i64,
    pub max_houses: u8,
    pub min_auction_price: i64,
    pub max_offer_tries: u32,
    pub max_std_actions_per_turn: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_rounds: 50,
            starting_money: 1500,
            start_pass_money: 200,
            jail_position: 10,
            jail_bail: 50,
            max_houses: 5,
            min_auction_price: 10,
            max_offer_tries: 1,
            max_std_actions_per_turn: 5,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be positive"));
        }
        if self.jail_position >= BOARD_SIZE {
            return Err(ConfigError::Invalid("jail_position must be on the board"));
        }
        if self.starting_money < 0
            || self.start_pass_money < 0
            || self.jail_bail < 0
            || self.min_auction_price < 0
        {
            return Err(ConfigError::Invalid("money amounts must not be negative"));
        }
        // Rent tables carry one tier per house count up to five.
        if self.max_houses > 5 {
            return Err(ConfigError::Invalid("max_houses cannot exceed 5"));
        }
        Ok(())
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub seed: u64,
    pub settings: GameSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            settings: GameSettings::default(),
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
}
