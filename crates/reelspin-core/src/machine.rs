//! Spin orchestration
//!
//! `SlotMachine` strings the pipeline together for one request:
//!
//! ```text
//! validate bet + grid ─► check balance ─► ReelSource::spin
//!        │                                      │
//!        └── reject (nothing generated)         v
//!                                     WinDetector::check_wins
//!                                               │
//!                                               v
//!                                  PayoutCalculator::calculate_payout
//!                                               │
//!                                               v
//!                                     SpinStore::commit_spin (atomic)
//! ```
//!
//! Every failure comes back as a `SpinOutcome` with `success = false`.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{GridLimits, MachineConfig, SpinConfig};
use crate::error::{SlotError, SlotResult};
use crate::payout::{LengthScale, MONEY_SCALE, PayoutCalculator};
use crate::reels::{ReelResult, ReelSource};
use crate::store::{PlayerAccount, SpinRecord, SpinStore};
use crate::symbols::SymbolCatalog;
use crate::wins::{WinData, WinDetector};

/// Result of a spin request, ready for the caller's wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reel_result: Option<ReelResult>,
    #[serde(default)]
    pub win_data: WinData,
    pub payout: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl SpinOutcome {
    fn completed(record: SpinRecord, account: &PlayerAccount) -> Self {
        Self {
            success: true,
            spin_id: Some(record.id),
            reel_result: Some(record.reel_result),
            win_data: record.win_data,
            payout: record.payout,
            current_balance: Some(account.balance),
            message: None,
            error_code: None,
        }
    }

    fn failed(error: &SlotError) -> Self {
        Self {
            success: false,
            spin_id: None,
            reel_result: None,
            win_data: WinData::NoWin,
            payout: Decimal::new(0, MONEY_SCALE),
            current_balance: None,
            message: Some(format!("Error processing spin: {error}")),
            error_code: Some(error.code().to_string()),
        }
    }

    pub fn is_win(&self) -> bool {
        self.success && self.payout > Decimal::ZERO
    }
}

/// Pipeline owner for one reel source
pub struct SlotMachine<S> {
    reels: S,
    detector: WinDetector,
    calculator: PayoutCalculator,
    store: Arc<dyn SpinStore>,
    default_spin: SpinConfig,
    limits: GridLimits,
    min_bet: Decimal,
}

impl<S: ReelSource> SlotMachine<S> {
    /// Machine with default detection, scaling and limits
    pub fn new(reels: S, catalog: Arc<SymbolCatalog>, store: Arc<dyn SpinStore>) -> Self {
        Self {
            reels,
            detector: WinDetector::default(),
            calculator: PayoutCalculator::new(catalog),
            store,
            default_spin: SpinConfig::default(),
            limits: GridLimits::default(),
            min_bet: Decimal::new(1, MONEY_SCALE),
        }
    }

    /// Machine configured from a validated `MachineConfig`
    pub fn from_config(
        config: &MachineConfig,
        reels: S,
        catalog: Arc<SymbolCatalog>,
        store: Arc<dyn SpinStore>,
    ) -> Self {
        let detector = WinDetector::new(config.strategies.clone())
            .with_min_run(config.min_matching_symbols);
        let calculator = PayoutCalculator::new(catalog)
            .with_scale(config.length_scale)
            .with_min_run(config.min_matching_symbols);
        Self {
            reels,
            detector,
            calculator,
            store,
            default_spin: config.spin,
            limits: config.limits,
            min_bet: config.min_bet,
        }
    }

    /// Replace win detection; the payout threshold follows the detector's
    pub fn with_detector(mut self, detector: WinDetector) -> Self {
        self.calculator = self.calculator.with_min_run(detector.min_run());
        self.detector = detector;
        self
    }

    pub fn with_length_scale(mut self, scale: LengthScale) -> Self {
        self.calculator = self.calculator.with_scale(scale);
        self
    }

    pub fn with_min_bet(mut self, min_bet: Decimal) -> Self {
        self.min_bet = min_bet;
        self
    }

    pub fn with_limits(mut self, limits: GridLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_default_spin(mut self, config: SpinConfig) -> Self {
        self.default_spin = config;
        self
    }

    pub fn detector(&self) -> &WinDetector {
        &self.detector
    }

    pub fn reels(&self) -> &S {
        &self.reels
    }

    /// Play one spin for `player_id`
    ///
    /// Bet and grid are validated before any generation work. Failures at
    /// any stage yield `success = false` and persist nothing.
    pub fn play_spin(
        &mut self,
        player_id: &str,
        bet_size: Decimal,
        config: Option<SpinConfig>,
    ) -> SpinOutcome {
        match self.try_play(player_id, bet_size, config) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Spin for {player_id} failed: {e}");
                SpinOutcome::failed(&e)
            }
        }
    }

    fn try_play(
        &mut self,
        player_id: &str,
        bet_size: Decimal,
        config: Option<SpinConfig>,
    ) -> SlotResult<SpinOutcome> {
        self.validate_bet(bet_size)?;
        let config = config.unwrap_or(self.default_spin);
        self.limits.check(&config)?;

        let account = self.store.account(player_id)?;
        if account.balance < bet_size {
            return Err(SlotError::InsufficientBalance {
                balance: account.balance,
                bet: bet_size,
            });
        }

        let reel_result = self.reels.spin(&config)?;
        log::debug!(
            "Generated {}×{} grid for {player_id}",
            reel_result.num_reels(),
            reel_result.visible_rows()
        );

        let win_data = self.detector.check_wins(&reel_result);
        let payout = self.calculator.calculate_payout(&win_data, bet_size)?;
        log::debug!("{} winning runs, payout {payout}", win_data.run_count());

        let record = SpinRecord::new(player_id, bet_size, reel_result, win_data, payout);
        let account = self.store.commit_spin(&record)?;
        log::info!(
            "Spin {} for {player_id}: bet {bet_size}, payout {payout}, balance {}",
            record.id,
            account.balance
        );

        Ok(SpinOutcome::completed(record, &account))
    }

    fn validate_bet(&self, bet_size: Decimal) -> SlotResult<()> {
        if bet_size <= Decimal::ZERO {
            return Err(SlotError::Validation(format!(
                "bet size must be positive, got {bet_size}"
            )));
        }
        if bet_size < self.min_bet {
            return Err(SlotError::Validation(format!(
                "bet size {bet_size} is below the minimum of {}",
                self.min_bet
            )));
        }
        if bet_size.normalize().scale() > MONEY_SCALE {
            return Err(SlotError::Validation(format!(
                "bet size {bet_size} has more than {MONEY_SCALE} decimal places"
            )));
        }
        Ok(())
    }

    /// Current account for a player
    pub fn account(&self, player_id: &str) -> SlotResult<PlayerAccount> {
        self.store.account(player_id)
    }

    /// Recent spins for a player, newest first
    pub fn history(&self, player_id: &str, limit: usize) -> SlotResult<Vec<SpinRecord>> {
        self.store.history(player_id, limit)
    }
}
