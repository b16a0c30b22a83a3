//! Payout calculation

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::MIN_MATCHING_SYMBOLS;
use crate::error::{SlotError, SlotResult};
use crate::symbols::SymbolCatalog;
use crate::wins::WinData;

/// Decimal places of every monetary amount
pub const MONEY_SCALE: u32 = 2;

/// How run length scales a symbol's multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthScale {
    /// Threshold length pays 1×, each further reel adds another 1×
    #[default]
    Stepped,
    /// Pays run length × multiplier
    Proportional,
}

impl LengthScale {
    /// Scaling factor for a run of `len` symbols; zero below the threshold
    pub fn factor(&self, len: usize, min_run: usize) -> Decimal {
        if len < min_run {
            return Decimal::ZERO;
        }
        let factor = match self {
            LengthScale::Stepped => len - min_run + 1,
            LengthScale::Proportional => len,
        };
        Decimal::from(factor)
    }
}

/// Round half-up to cents, always returning two decimal places
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Converts detected wins into a payout using catalog multipliers
#[derive(Debug, Clone)]
pub struct PayoutCalculator {
    catalog: Arc<SymbolCatalog>,
    scale: LengthScale,
    min_run: usize,
}

impl PayoutCalculator {
    pub fn new(catalog: Arc<SymbolCatalog>) -> Self {
        Self {
            catalog,
            scale: LengthScale::default(),
            min_run: MIN_MATCHING_SYMBOLS,
        }
    }

    /// Set run-length scaling
    pub fn with_scale(mut self, scale: LengthScale) -> Self {
        self.scale = scale;
        self
    }

    /// Set the threshold the scaling is measured from
    pub fn with_min_run(mut self, min_run: usize) -> Self {
        self.min_run = min_run.max(1);
        self
    }

    pub fn scale(&self) -> LengthScale {
        self.scale
    }

    /// Payout for a single run before rounding
    pub fn run_payout(&self, symbol: &str, len: usize, bet_size: Decimal) -> SlotResult<Decimal> {
        let symbol = self
            .catalog
            .lookup(symbol)
            .map_err(|_| SlotError::UnknownSymbol(symbol.to_string()))?;
        bet_size
            .checked_mul(symbol.payout_multiplier)
            .and_then(|amount| amount.checked_mul(self.scale.factor(len, self.min_run)))
            .ok_or_else(|| {
                SlotError::Overflow(format!("payout for {len} × {} at bet {bet_size}", symbol.name))
            })
    }

    /// Total payout for a spin, rounded half-up to cents
    pub fn calculate_payout(&self, win_data: &WinData, bet_size: Decimal) -> SlotResult<Decimal> {
        if bet_size <= Decimal::ZERO {
            return Err(SlotError::Validation(format!(
                "bet size must be positive, got {bet_size}"
            )));
        }

        let mut total = Decimal::ZERO;
        for (line, run) in win_data.runs() {
            let amount = self.run_payout(&run.symbol, run.len(), bet_size)?;
            log::debug!("{line}: {} × {} pays {amount}", run.len(), run.symbol);
            total = total
                .checked_add(amount)
                .ok_or_else(|| SlotError::Overflow(format!("spin payout at bet {bet_size}")))?;
        }

        Ok(round_money(total))
    }
}
