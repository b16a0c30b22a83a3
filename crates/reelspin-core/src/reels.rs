//! Reel grid generation

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::SpinConfig;
use crate::error::{SlotError, SlotResult};
use crate::runs::transpose;
use crate::symbols::SymbolCatalog;

/// Symbols showing on each reel after a spin
///
/// Keys are exactly `0..num_reels` and every reel shows the same number of
/// rows. Serialized as a map from reel index to the reel's visible symbols,
/// top row first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<usize, Vec<String>>", into = "BTreeMap<usize, Vec<String>>")]
pub struct ReelResult {
    reels: Vec<Vec<String>>,
}

impl ReelResult {
    /// Build from reels in order, checking the grid is non-empty and rectangular
    pub fn from_reels(reels: Vec<Vec<String>>) -> SlotResult<Self> {
        let Some(rows) = reels.first().map(Vec::len) else {
            return Err(SlotError::InvalidConfig("reel result has no reels".into()));
        };
        if rows == 0 {
            return Err(SlotError::InvalidConfig("reels show no rows".into()));
        }
        if let Some(idx) = reels.iter().position(|reel| reel.len() != rows) {
            return Err(SlotError::InvalidConfig(format!(
                "reel {idx} shows {} rows, expected {rows}",
                reels[idx].len()
            )));
        }
        Ok(Self { reels })
    }

    pub fn num_reels(&self) -> usize {
        self.reels.len()
    }

    pub fn visible_rows(&self) -> usize {
        self.reels.first().map_or(0, Vec::len)
    }

    /// Shape of this grid
    pub fn config(&self) -> SpinConfig {
        SpinConfig::new(self.num_reels(), self.visible_rows())
    }

    /// Visible symbols on one reel, top row first
    pub fn reel(&self, index: usize) -> Option<&[String]> {
        self.reels.get(index).map(Vec::as_slice)
    }

    pub fn reels(&self) -> &[Vec<String>] {
        &self.reels
    }

    /// Symbol at a grid position
    pub fn symbol_at(&self, reel: usize, row: usize) -> Option<&str> {
        self.reels
            .get(reel)
            .and_then(|r| r.get(row))
            .map(String::as_str)
    }

    /// Flip reels into rows: row `r` holds position `r` of every reel, in reel order
    pub fn rows(&self) -> Vec<Vec<&str>> {
        let borrowed: Vec<Vec<&str>> = self
            .reels
            .iter()
            .map(|reel| reel.iter().map(String::as_str).collect())
            .collect();
        transpose(&borrowed)
    }
}

impl TryFrom<BTreeMap<usize, Vec<String>>> for ReelResult {
    type Error = SlotError;

    fn try_from(map: BTreeMap<usize, Vec<String>>) -> SlotResult<Self> {
        if let Some((idx, _)) = map.iter().enumerate().find(|(pos, (key, _))| *pos != **key) {
            return Err(SlotError::InvalidConfig(format!(
                "reel indices must be contiguous from 0, missing reel {idx}"
            )));
        }
        Self::from_reels(map.into_values().collect())
    }
}

impl From<ReelResult> for BTreeMap<usize, Vec<String>> {
    fn from(result: ReelResult) -> Self {
        result.reels.into_iter().enumerate().collect()
    }
}

/// Anything that can produce a grid for a spin
pub trait ReelSource {
    fn spin(&mut self, config: &SpinConfig) -> SlotResult<ReelResult>;
}

/// Weighted random reel generator
///
/// Every position is an independent draw from the catalog, so a symbol may
/// repeat within a reel.
pub struct ReelGenerator<R = ChaCha8Rng> {
    catalog: Arc<SymbolCatalog>,
    rng: R,
}

impl ReelGenerator<ChaCha8Rng> {
    /// Generator seeded from the OS
    pub fn new(catalog: Arc<SymbolCatalog>) -> Self {
        Self::with_rng(catalog, ChaCha8Rng::from_os_rng())
    }

    /// Seed RNG for reproducible results
    pub fn seeded(catalog: Arc<SymbolCatalog>, seed: u64) -> Self {
        Self::with_rng(catalog, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ReelGenerator<R> {
    /// Generator drawing from a caller-supplied random source
    pub fn with_rng(catalog: Arc<SymbolCatalog>, rng: R) -> Self {
        Self { catalog, rng }
    }

    pub fn catalog(&self) -> &Arc<SymbolCatalog> {
        &self.catalog
    }

    /// Draw `visible_rows` symbols for each of `num_reels` reels
    pub fn generate(&mut self, config: &SpinConfig) -> SlotResult<ReelResult> {
        config.validate()?;

        let reels = (0..config.num_reels)
            .map(|_| {
                (0..config.visible_rows)
                    .map(|_| self.catalog.weighted_choice(&mut self.rng).name.clone())
                    .collect()
            })
            .collect();

        Ok(ReelResult { reels })
    }
}

impl<R: Rng> ReelSource for ReelGenerator<R> {
    fn spin(&mut self, config: &SpinConfig) -> SlotResult<ReelResult> {
        self.generate(config)
    }
}
