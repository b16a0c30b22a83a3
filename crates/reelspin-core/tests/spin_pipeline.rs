//! Spin pipeline integration tests
//!
//! Drives `SlotMachine` end to end with scripted reel sources so grids,
//! wins and payouts can be asserted exactly.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use reelspin_core::{
    LengthScale, LineWin, MachineConfig, MemorySpinStore, PayoutCalculator, ReelGenerator,
    ReelResult, ReelSource, SessionStats, SlotError, SlotMachine, SlotResult, SpinConfig,
    SpinStore, SymbolCatalog, WinData, WinDetector, WinLine, WinRun, WinStrategy,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

/// Reel source that replays fixed grids and counts how often it is asked
struct ScriptedReels {
    grids: Vec<ReelResult>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedReels {
    fn new(grids: Vec<ReelResult>) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                grids,
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl ReelSource for ScriptedReels {
    fn spin(&mut self, _config: &SpinConfig) -> SlotResult<ReelResult> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        self.grids
            .get(call % self.grids.len())
            .cloned()
            .ok_or_else(|| SlotError::InvalidConfig("no scripted grid".into()))
    }
}

fn grid(reels: &[&[&str]]) -> ReelResult {
    ReelResult::from_reels(
        reels
            .iter()
            .map(|reel| reel.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
    .unwrap()
}

/// 5×3 grid with diamond on reels 0..=2 of row 1 (top) and nothing else
fn diamond_row_one() -> ReelResult {
    grid(&[
        &["diamond", "floppy", "telephone"],
        &["diamond", "hourglass", "floppy"],
        &["diamond", "telephone", "hourglass2"],
        &["hourglass", "floppy", "telephone"],
        &["telephone", "hourglass2", "floppy"],
    ])
}

fn losing_grid() -> ReelResult {
    grid(&[
        &["floppy", "diamond", "telephone"],
        &["hourglass", "telephone", "floppy"],
        &["telephone", "diamond", "hourglass2"],
        &["floppy", "hourglass", "telephone"],
        &["hourglass2", "telephone", "floppy"],
    ])
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn store_with(player: &str, balance: Decimal) -> Arc<MemorySpinStore> {
    let store = Arc::new(MemorySpinStore::new());
    store.open_account(player, balance);
    store
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAY SPIN
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn known_grid_pays_expected_amount() {
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("alice", dec!(1000.00));
    let (reels, calls) = ScriptedReels::new(vec![diamond_row_one()]);
    let mut machine = SlotMachine::new(reels, catalog, store.clone());

    let outcome = machine.play_spin("alice", dec!(10.00), None);

    assert!(outcome.success, "{:?}", outcome.message);
    assert_eq!(calls.get(), 1);
    // diamond 3.00 × bet 10.00 at the threshold length
    assert_eq!(outcome.payout, dec!(30.00));
    assert_eq!(
        outcome.win_data,
        WinData::Wins(vec![LineWin {
            line: WinLine::Row(1),
            runs: vec![WinRun::new("diamond", vec![0, 1, 2])],
        }])
    );
    assert_eq!(outcome.current_balance, Some(dec!(1020.00)));

    let account = store.account("alice").unwrap();
    assert_eq!(account.total_wager, dec!(10.00));
    assert_eq!(account.total_won, dec!(30.00));

    let history = store.history("alice", 1).unwrap();
    assert_eq!(history[0].id, outcome.spin_id.unwrap());
    assert_eq!(history[0].reel_result, diamond_row_one());
}

#[test]
fn losing_grid_pays_zero_and_debits_bet() {
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("alice", dec!(100.00));
    let (reels, _) = ScriptedReels::new(vec![losing_grid()]);
    let mut machine = SlotMachine::new(reels, catalog, store);

    let outcome = machine.play_spin("alice", dec!(2.50), None);
    assert!(outcome.success);
    assert_eq!(outcome.win_data, WinData::NoWin);
    assert_eq!(outcome.payout.to_string(), "0.00");
    assert_eq!(outcome.current_balance, Some(dec!(97.50)));
}

#[test]
fn non_positive_bet_never_reaches_generator() {
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("alice", dec!(100.00));
    let (reels, calls) = ScriptedReels::new(vec![diamond_row_one()]);
    let mut machine = SlotMachine::new(reels, catalog, store.clone());

    for bet in [Decimal::ZERO, dec!(-1.00)] {
        let outcome = machine.play_spin("alice", bet, None);
        assert!(!outcome.success);
        assert_eq!(outcome.error_code.as_deref(), Some("validation"));
        assert!(outcome.reel_result.is_none());
    }

    assert_eq!(calls.get(), 0);
    assert_eq!(store.spin_count(), 0);
    assert_eq!(store.account("alice").unwrap().balance, dec!(100.00));
}

#[test]
fn insufficient_balance_never_reaches_generator() {
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("bob", dec!(5.00));
    let (reels, calls) = ScriptedReels::new(vec![diamond_row_one()]);
    let mut machine = SlotMachine::new(reels, catalog, store);

    let outcome = machine.play_spin("bob", dec!(10.00), None);
    assert_eq!(outcome.error_code.as_deref(), Some("insufficient_balance"));
    assert_eq!(calls.get(), 0);
}

#[test]
fn unknown_symbol_mid_pipeline_persists_nothing() {
    // Generator emits a name the payout catalog has never heard of
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("alice", dec!(100.00));
    let rogue = grid(&[&["cherry"], &["cherry"], &["cherry"]]);
    let (reels, calls) = ScriptedReels::new(vec![rogue]);
    let mut machine = SlotMachine::new(reels, catalog, store.clone());

    let outcome = machine.play_spin("alice", dec!(10.00), Some(SpinConfig::new(3, 1)));

    assert_eq!(calls.get(), 1);
    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("unknown_symbol"));
    assert!(outcome.message.unwrap().contains("cherry"));
    assert_eq!(store.spin_count(), 0);

    let account = store.account("alice").unwrap();
    assert_eq!(account.balance, dec!(100.00));
    assert_eq!(account.total_wager, Decimal::ZERO);
}

#[test]
fn oversized_bet_fails_without_panicking() {
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("whale", Decimal::MAX);
    let diamonds = grid(&[&["diamond"], &["diamond"], &["diamond"]]);
    let (reels, calls) = ScriptedReels::new(vec![diamonds]);
    let mut machine = SlotMachine::new(reels, catalog, store.clone());

    let bet = Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0);
    let outcome = machine.play_spin("whale", bet, Some(SpinConfig::new(3, 1)));

    assert_eq!(calls.get(), 1);
    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("overflow"));
    assert_eq!(store.spin_count(), 0);
    assert_eq!(store.account("whale").unwrap().balance, Decimal::MAX);
}

#[test]
fn diagonal_and_row_both_pay() {
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("alice", dec!(100.00));
    // Top row and the main diagonal are both telephone
    let board = grid(&[
        &["telephone", "floppy", "diamond"],
        &["telephone", "telephone", "hourglass"],
        &["telephone", "diamond", "telephone"],
    ]);
    let (reels, _) = ScriptedReels::new(vec![board]);
    let mut machine = SlotMachine::new(reels, catalog, store);

    let outcome = machine.play_spin("alice", dec!(1.00), Some(SpinConfig::new(3, 3)));
    assert!(outcome.success);
    assert!(outcome.win_data.get(WinLine::Row(1)).is_some());
    assert!(outcome.win_data.get(WinLine::MainDiagonal).is_some());
    // telephone 2.50 on two lines
    assert_eq!(outcome.payout, dec!(5.00));

    let (reels, _) = ScriptedReels::new(vec![grid(&[
        &["telephone", "floppy", "diamond"],
        &["telephone", "telephone", "hourglass"],
        &["telephone", "diamond", "telephone"],
    ])]);
    let mut rows_only = SlotMachine::new(
        reels,
        Arc::new(SymbolCatalog::classic().unwrap()),
        store_with("alice", dec!(100.00)),
    )
    .with_detector(WinDetector::horizontal());
    let outcome = rows_only.play_spin("alice", dec!(1.00), Some(SpinConfig::new(3, 3)));
    assert_eq!(outcome.payout, dec!(2.50));
}

#[test]
fn proportional_scale_from_config() {
    let config = MachineConfig {
        length_scale: LengthScale::Proportional,
        strategies: vec![WinStrategy::Horizontal],
        ..MachineConfig::default()
    };
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("alice", dec!(100.00));
    let (reels, _) = ScriptedReels::new(vec![diamond_row_one()]);
    let mut machine = SlotMachine::from_config(&config, reels, catalog, store);

    let outcome = machine.play_spin("alice", dec!(1.00), None);
    // diamond 3.00 × 3 reels
    assert_eq!(outcome.payout, dec!(9.00));
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYOUT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn injected_unknown_symbol_is_an_error() {
    let calc = PayoutCalculator::new(Arc::new(SymbolCatalog::classic().unwrap()));
    let wins = WinData::Wins(vec![LineWin {
        line: WinLine::Row(1),
        runs: vec![
            WinRun::new("diamond", vec![0, 1, 2]),
            WinRun::new("ghost", vec![3, 4, 5]),
        ],
    }]);
    let result = calc.calculate_payout(&wins, dec!(10.00));
    assert!(matches!(result, Err(SlotError::UnknownSymbol(name)) if name == "ghost"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURES & RANDOM SESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn fixtures_load() {
    let catalog = SymbolCatalog::load(fixture("symbols.yaml")).unwrap();
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog.lookup("floppy").unwrap().weight, 2.0);

    let config = MachineConfig::load(fixture("machine.yaml")).unwrap();
    assert_eq!(config.spin, SpinConfig::new(5, 3));
    assert_eq!(config.starting_balance, dec!(1000.00));
    assert_eq!(config.strategies, vec![WinStrategy::Horizontal, WinStrategy::Diagonal]);
}

#[test]
fn unsupported_fixture_extension() {
    let path = std::env::temp_dir().join(format!("reelspin-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, "[[symbols]]\nname = \"bar\"\npayout_multiplier = \"1.00\"\n").unwrap();

    let catalog = SymbolCatalog::load(&path);
    let config = MachineConfig::load(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(catalog, Err(SlotError::Parse(msg)) if msg.contains("Unsupported")));
    assert!(matches!(config, Err(SlotError::Parse(_))));
}

#[test]
fn seeded_sessions_are_reproducible() {
    let catalog = Arc::new(SymbolCatalog::load(fixture("symbols.yaml")).unwrap());

    let play = |seed: u64| {
        let store = store_with("alice", dec!(10000.00));
        let reels = ReelGenerator::seeded(Arc::clone(&catalog), seed);
        let mut machine = SlotMachine::new(reels, Arc::clone(&catalog), store);
        (0..50)
            .map(|_| {
                let outcome = machine.play_spin("alice", dec!(1.00), None);
                (outcome.reel_result, outcome.win_data, outcome.payout)
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(play(7), play(7));
}

#[test]
fn random_session_keeps_books_balanced() {
    let catalog = Arc::new(SymbolCatalog::classic().unwrap());
    let store = store_with("alice", dec!(10000.00));
    let reels = ReelGenerator::seeded(Arc::clone(&catalog), 42);
    let mut machine = SlotMachine::new(reels, catalog, store.clone());
    let mut stats = SessionStats::new();

    for _ in 0..200 {
        let outcome = machine.play_spin("alice", dec!(1.00), None);
        assert!(outcome.success);
        stats.record(&outcome, dec!(1.00));
    }

    let account = store.account("alice").unwrap();
    assert_eq!(stats.total_spins, 200);
    assert_eq!(account.total_wager, stats.total_bet);
    assert_eq!(account.total_won, stats.total_win);
    assert_eq!(
        account.balance,
        dec!(10000.00) - account.total_wager + account.total_won
    );
    assert_eq!(store.spin_count(), 200);
}
