//! Session statistics

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::machine::SpinOutcome;

/// Running totals over a batch of spins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: Decimal,
    pub total_win: Decimal,
    pub wins: u64,
    pub losses: u64,
    /// Rejected or failed requests, not counted as spins
    pub failures: u64,
    pub max_win_ratio: Decimal,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally one outcome placed with `bet`
    pub fn record(&mut self, outcome: &SpinOutcome, bet: Decimal) {
        if !outcome.success {
            self.failures += 1;
            return;
        }

        self.total_spins += 1;
        self.total_bet = self.total_bet.saturating_add(bet);
        self.total_win = self.total_win.saturating_add(outcome.payout);

        if outcome.is_win() {
            self.wins += 1;
            if let Some(ratio) = outcome.payout.checked_div(bet) {
                self.max_win_ratio = self.max_win_ratio.max(ratio);
            }
        } else {
            self.losses += 1;
        }
    }

    /// Calculate RTP (percent), `None` until a bet has been recorded or if
    /// the ratio does not fit a `Decimal`
    pub fn rtp(&self) -> Option<f64> {
        if self.total_bet <= Decimal::ZERO {
            return None;
        }
        self.total_win
            .checked_div(self.total_bet)?
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_f64()
    }

    /// Calculate hit rate (percent)
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}
