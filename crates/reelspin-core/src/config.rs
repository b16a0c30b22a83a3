//! Machine configuration

use std::path::Path;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::payout::LengthScale;
use crate::wins::WinStrategy;

/// Reels per spin when the caller does not override it
pub const DEFAULT_NUM_REELS: usize = 5;
/// Visible rows per reel when the caller does not override it
pub const DEFAULT_VISIBLE_ROWS: usize = 3;
/// Shortest run that counts as a win
pub const MIN_MATCHING_SYMBOLS: usize = 3;

/// Grid shape for a single spin (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinConfig {
    /// Number of reels (columns)
    pub num_reels: usize,
    /// Number of visible rows per reel
    pub visible_rows: usize,
}

impl SpinConfig {
    pub fn new(num_reels: usize, visible_rows: usize) -> Self {
        Self {
            num_reels,
            visible_rows,
        }
    }

    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self::new(DEFAULT_NUM_REELS, DEFAULT_VISIBLE_ROWS)
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.num_reels * self.visible_rows
    }

    pub fn validate(&self) -> SlotResult<()> {
        if self.num_reels == 0 {
            return Err(SlotError::InvalidConfig(
                "num_reels must be at least 1".into(),
            ));
        }
        if self.visible_rows == 0 {
            return Err(SlotError::InvalidConfig(
                "visible_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Upper bounds on grid size accepted from callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLimits {
    pub max_reels: usize,
    pub max_rows: usize,
}

impl GridLimits {
    /// Validate a spin config against these limits
    pub fn check(&self, config: &SpinConfig) -> SlotResult<()> {
        config.validate()?;
        if config.num_reels > self.max_reels {
            return Err(SlotError::InvalidConfig(format!(
                "Too many reels: {} > {}",
                config.num_reels, self.max_reels
            )));
        }
        if config.visible_rows > self.max_rows {
            return Err(SlotError::InvalidConfig(format!(
                "Too many rows: {} > {}",
                config.visible_rows, self.max_rows
            )));
        }
        Ok(())
    }
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_reels: 10,
            max_rows: 10,
        }
    }
}

/// Complete machine configuration
///
/// Every field has a default, so an empty document yields a standard
/// 5×3 machine with horizontal and diagonal lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Grid used when a request carries no override
    #[serde(default)]
    pub spin: SpinConfig,
    /// Smallest accepted bet
    #[serde(default = "default_min_bet")]
    pub min_bet: Decimal,
    /// Shortest qualifying run
    #[serde(default = "default_min_run")]
    pub min_matching_symbols: usize,
    /// Win lines to evaluate
    #[serde(default = "default_strategies")]
    pub strategies: Vec<WinStrategy>,
    /// Run-length scaling applied to payouts
    #[serde(default)]
    pub length_scale: LengthScale,
    #[serde(default)]
    pub limits: GridLimits,
    /// Balance credited to newly opened accounts
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Decimal,
    /// Fixed RNG seed for reproducible sessions
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_min_bet() -> Decimal {
    Decimal::new(1, 2)
}

fn default_min_run() -> usize {
    MIN_MATCHING_SYMBOLS
}

fn default_strategies() -> Vec<WinStrategy> {
    vec![WinStrategy::Horizontal, WinStrategy::Diagonal]
}

fn default_starting_balance() -> Decimal {
    Decimal::new(100_000, 2)
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            spin: SpinConfig::default(),
            min_bet: default_min_bet(),
            min_matching_symbols: default_min_run(),
            strategies: default_strategies(),
            length_scale: LengthScale::default(),
            limits: GridLimits::default(),
            starting_balance: default_starting_balance(),
            seed: None,
        }
    }
}

impl MachineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> SlotResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SlotError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> SlotResult<Self> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| SlotError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let config: Self = read_document(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SlotResult<()> {
        self.limits.check(&self.spin)?;
        if self.min_bet <= Decimal::ZERO {
            return Err(SlotError::Validation(format!(
                "min_bet must be positive, got {}",
                self.min_bet
            )));
        }
        if self.min_matching_symbols < 2 {
            return Err(SlotError::InvalidConfig(format!(
                "min_matching_symbols must be at least 2, got {}",
                self.min_matching_symbols
            )));
        }
        if self.strategies.is_empty() {
            return Err(SlotError::InvalidConfig(
                "at least one win strategy is required".into(),
            ));
        }
        if self.starting_balance < Decimal::ZERO {
            return Err(SlotError::Validation(format!(
                "starting_balance must not be negative, got {}",
                self.starting_balance
            )));
        }
        Ok(())
    }
}

/// Read and deserialize a JSON or YAML file, chosen by extension
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> SlotResult<T> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(|e| SlotError::Parse(e.to_string()))
        }
        Some("yaml") | Some("yml") => {
            let text = std::fs::read_to_string(path)?;
            serde_yml::from_str(&text).map_err(|e| SlotError::Parse(e.to_string()))
        }
        other => Err(SlotError::Parse(format!(
            "Unsupported file extension {:?} for {}",
            other,
            path.display()
        ))),
    }
}
