//! Spin records and player accounts

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SlotError, SlotResult};
use crate::reels::ReelResult;
use crate::wins::WinData;

/// Player balance and lifetime totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAccount {
    pub player_id: String,
    pub balance: Decimal,
    pub total_wager: Decimal,
    pub total_won: Decimal,
}

impl PlayerAccount {
    pub fn new(player_id: impl Into<String>, balance: Decimal) -> Self {
        Self {
            player_id: player_id.into(),
            balance,
            total_wager: Decimal::ZERO,
            total_won: Decimal::ZERO,
        }
    }

    /// Account after paying `bet` and receiving `payout`
    fn settled(&self, bet: Decimal, payout: Decimal) -> SlotResult<Self> {
        if self.balance < bet {
            return Err(SlotError::InsufficientBalance {
                balance: self.balance,
                bet,
            });
        }
        let overflow = |field: &str| {
            SlotError::Overflow(format!("{field} for player {}", self.player_id))
        };
        Ok(Self {
            player_id: self.player_id.clone(),
            balance: self
                .balance
                .checked_sub(bet)
                .and_then(|balance| balance.checked_add(payout))
                .ok_or_else(|| overflow("balance"))?,
            total_wager: self
                .total_wager
                .checked_add(bet)
                .ok_or_else(|| overflow("total wager"))?,
            total_won: self
                .total_won
                .checked_add(payout)
                .ok_or_else(|| overflow("total won"))?,
        })
    }
}

/// One completed spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub id: Uuid,
    pub player_id: String,
    pub bet_size: Decimal,
    pub reel_result: ReelResult,
    pub win_data: WinData,
    pub payout: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl SpinRecord {
    pub fn new(
        player_id: impl Into<String>,
        bet_size: Decimal,
        reel_result: ReelResult,
        win_data: WinData,
        payout: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id: player_id.into(),
            bet_size,
            reel_result,
            win_data,
            payout,
            timestamp: Utc::now(),
        }
    }

    pub fn is_win(&self) -> bool {
        self.win_data.is_win() && self.payout > Decimal::ZERO
    }
}

/// Persistence boundary for spins
///
/// `commit_spin` is the transactional unit: the bet debit, payout credit
/// and record append either all land or none do.
pub trait SpinStore: Send + Sync {
    /// Current account state
    fn account(&self, player_id: &str) -> SlotResult<PlayerAccount>;

    /// Settle and persist a spin, returning the updated account
    fn commit_spin(&self, record: &SpinRecord) -> SlotResult<PlayerAccount>;

    /// Most recent spins for a player, newest first
    fn history(&self, player_id: &str, limit: usize) -> SlotResult<Vec<SpinRecord>>;
}

#[derive(Debug, Default)]
struct Ledger {
    accounts: HashMap<String, PlayerAccount>,
    spins: Vec<SpinRecord>,
}

/// In-process store guarded by a single lock
#[derive(Debug, Default)]
pub struct MemorySpinStore {
    ledger: RwLock<Ledger>,
}

impl MemorySpinStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an account, or return the existing one unchanged
    pub fn open_account(&self, player_id: &str, balance: Decimal) -> PlayerAccount {
        self.ledger
            .write()
            .accounts
            .entry(player_id.to_string())
            .or_insert_with(|| PlayerAccount::new(player_id, balance))
            .clone()
    }

    /// Total persisted spins across all players
    pub fn spin_count(&self) -> usize {
        self.ledger.read().spins.len()
    }

    pub fn find_spin(&self, id: Uuid) -> Option<SpinRecord> {
        self.ledger.read().spins.iter().find(|s| s.id == id).cloned()
    }
}

impl SpinStore for MemorySpinStore {
    fn account(&self, player_id: &str) -> SlotResult<PlayerAccount> {
        self.ledger
            .read()
            .accounts
            .get(player_id)
            .cloned()
            .ok_or_else(|| SlotError::PlayerNotFound(player_id.to_string()))
    }

    fn commit_spin(&self, record: &SpinRecord) -> SlotResult<PlayerAccount> {
        let mut ledger = self.ledger.write();

        if ledger.spins.iter().any(|s| s.id == record.id) {
            return Err(SlotError::Storage(format!(
                "spin {} already recorded",
                record.id
            )));
        }

        let current = ledger
            .accounts
            .get(&record.player_id)
            .ok_or_else(|| SlotError::PlayerNotFound(record.player_id.clone()))?;
        let updated = current.settled(record.bet_size, record.payout)?;

        ledger
            .accounts
            .insert(record.player_id.clone(), updated.clone());
        ledger.spins.push(record.clone());
        Ok(updated)
    }

    fn history(&self, player_id: &str, limit: usize) -> SlotResult<Vec<SpinRecord>> {
        let ledger = self.ledger.read();
        if !ledger.accounts.contains_key(player_id) {
            return Err(SlotError::PlayerNotFound(player_id.to_string()));
        }
        Ok(ledger
            .spins
            .iter()
            .rev()
            .filter(|s| s.player_id == player_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
