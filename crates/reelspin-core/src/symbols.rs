//! Symbol definitions and the read-only catalog

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use rand::distr::weighted::WeightedIndex;
use rand::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::read_document;
use crate::error::{SlotError, SlotResult};

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol name (e.g., "diamond", "telephone")
    pub name: String,
    /// Relative draw weight on every reel
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Bet multiplier for a win at the threshold length
    pub payout_multiplier: Decimal,
    /// Artwork reference for presentation layers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl Symbol {
    /// Create a symbol with unit weight
    pub fn new(name: impl Into<String>, payout_multiplier: Decimal) -> Self {
        Self {
            name: name.into(),
            weight: default_weight(),
            payout_multiplier,
            image_path: None,
        }
    }

    /// Set draw weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set artwork path
    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }
}

/// Fixture layout: either a bare list or `{ symbols: [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Symbol>),
    Wrapped { symbols: Vec<Symbol> },
}

impl CatalogDocument {
    fn into_symbols(self) -> Vec<Symbol> {
        match self {
            CatalogDocument::List(symbols) | CatalogDocument::Wrapped { symbols } => symbols,
        }
    }
}

/// Seed symbols: name, payout multiplier in hundredths, artwork
const CLASSIC_SYMBOLS: [(&str, i64, &str); 5] = [
    ("diamond", 300, "graphics/0/symbols/0_diamond.png"),
    ("floppy", 200, "graphics/0/symbols/0_floppy.png"),
    ("hourglass", 150, "graphics/0/symbols/0_hourglass.png"),
    ("hourglass2", 150, "graphics/0/symbols/0_hourglass.png"),
    ("telephone", 250, "graphics/0/symbols/0_telephone.png"),
];

/// Immutable set of symbols with a precomputed draw distribution
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, usize>,
    distribution: WeightedIndex<f64>,
}

impl SymbolCatalog {
    /// Build a catalog, rejecting empty sets, duplicate names, bad weights
    /// and negative multipliers
    pub fn new(symbols: Vec<Symbol>) -> SlotResult<Self> {
        if symbols.is_empty() {
            return Err(SlotError::InvalidCatalog("catalog has no symbols".into()));
        }

        let mut by_name = HashMap::with_capacity(symbols.len());
        for (idx, symbol) in symbols.iter().enumerate() {
            if symbol.name.is_empty() {
                return Err(SlotError::InvalidCatalog(format!(
                    "symbol #{idx} has an empty name"
                )));
            }
            if !symbol.weight.is_finite() || symbol.weight <= 0.0 {
                return Err(SlotError::InvalidCatalog(format!(
                    "symbol {} has non-positive weight {}",
                    symbol.name, symbol.weight
                )));
            }
            if symbol.payout_multiplier < Decimal::ZERO {
                return Err(SlotError::InvalidCatalog(format!(
                    "symbol {} has negative payout multiplier {}",
                    symbol.name, symbol.payout_multiplier
                )));
            }
            if by_name.insert(symbol.name.clone(), idx).is_some() {
                return Err(SlotError::InvalidCatalog(format!(
                    "duplicate symbol name: {}",
                    symbol.name
                )));
            }
        }

        let distribution = WeightedIndex::new(symbols.iter().map(|s| s.weight))
            .map_err(|e| SlotError::InvalidCatalog(e.to_string()))?;

        Ok(Self {
            symbols,
            by_name,
            distribution,
        })
    }

    /// Built-in seed set
    pub fn classic() -> SlotResult<Self> {
        let symbols = CLASSIC_SYMBOLS
            .iter()
            .map(|&(name, multiplier_cents, image)| {
                Symbol::new(name, Decimal::new(multiplier_cents, 2)).with_image(image)
            })
            .collect();
        Self::new(symbols)
    }

    /// Parse a JSON fixture
    pub fn from_json_str(json: &str) -> SlotResult<Self> {
        let doc: CatalogDocument =
            serde_json::from_str(json).map_err(|e| SlotError::Parse(e.to_string()))?;
        Self::new(doc.into_symbols())
    }

    /// Parse a YAML fixture
    pub fn from_yaml_str(yaml: &str) -> SlotResult<Self> {
        let doc: CatalogDocument =
            serde_yml::from_str(yaml).map_err(|e| SlotError::Parse(e.to_string()))?;
        Self::new(doc.into_symbols())
    }

    /// Load a `.json`, `.yaml` or `.yml` fixture
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let doc: CatalogDocument = read_document(path.as_ref())?;
        Self::new(doc.into_symbols())
    }

    /// All symbols in load order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Get symbol by name
    pub fn lookup(&self, name: &str) -> SlotResult<&Symbol> {
        self.by_name
            .get(name)
            .map(|&idx| &self.symbols[idx])
            .ok_or_else(|| SlotError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Draw one symbol with probability `weight / total_weight`
    pub fn weighted_choice<R: Rng + ?Sized>(&self, rng: &mut R) -> &Symbol {
        &self.symbols[self.distribution.sample(rng)]
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.symbols.iter().map(|s| s.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

static GLOBAL_CATALOG: OnceLock<Arc<SymbolCatalog>> = OnceLock::new();

/// Install the process-wide catalog. Only the first call succeeds.
pub fn install_global(catalog: SymbolCatalog) -> SlotResult<Arc<SymbolCatalog>> {
    let catalog = Arc::new(catalog);
    GLOBAL_CATALOG
        .set(Arc::clone(&catalog))
        .map_err(|_| {
            SlotError::InvalidCatalog("global symbol catalog already installed".into())
        })?;
    log::info!("Installed global symbol catalog ({} symbols)", catalog.len());
    Ok(catalog)
}

/// Process-wide catalog, if one was installed
pub fn global_catalog() -> Option<Arc<SymbolCatalog>> {
    GLOBAL_CATALOG.get().cloned()
}
