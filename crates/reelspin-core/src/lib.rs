//! # reelspin-core: reel slot spin engine
//!
//! Generates weighted reel grids, detects winning runs and settles payouts
//! with exact decimal arithmetic.
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine
//!     │
//!     ├── ReelSource (ReelGenerator over a SymbolCatalog)
//!     ├── WinDetector (Horizontal, Diagonal strategies)
//!     ├── PayoutCalculator (catalog multipliers × run length)
//!     └── SpinStore (atomic settle + record)
//!           │
//!           v
//!     SpinOutcome
//! ```
//!
//! The catalog is loaded once and shared read-only through `Arc`, so any
//! number of machines can spin against it concurrently.

pub mod config;
pub mod error;
pub mod machine;
pub mod payout;
pub mod reels;
pub mod runs;
pub mod stats;
pub mod store;
pub mod symbols;
pub mod wins;

pub use config::*;
pub use error::*;
pub use machine::*;
pub use payout::*;
pub use reels::*;
pub use runs::*;
pub use stats::*;
pub use store::*;
pub use symbols::*;
pub use wins::*;
