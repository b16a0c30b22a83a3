//! reelspin simulator
//!
//! Usage:
//!   reelspin-sim play --bet 1.00 --spins 100    - Play a batch of spins
//!   reelspin-sim catalog                        - Print the symbol catalog
//!
//! Set RUST_LOG=debug to trace every pipeline stage.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use reelspin_core::{
    MachineConfig, MemorySpinStore, ReelGenerator, SessionStats, SlotMachine, SpinConfig,
    SymbolCatalog, install_global,
};

#[derive(Parser)]
#[command(name = "reelspin-sim", about = "Play batches of slot spins")]
struct Cli {
    /// Machine configuration (JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Symbol catalog fixture (JSON or YAML); the classic set if omitted
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a batch of spins for one player
    Play {
        /// Bet per spin
        #[arg(short, long, default_value = "1.00")]
        bet: Decimal,

        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 10)]
        spins: u32,

        /// Player id
        #[arg(short, long, default_value = "player-1")]
        player: String,

        /// Override the configured reel count
        #[arg(long)]
        reels: Option<usize>,

        /// Override the configured row count
        #[arg(long)]
        rows: Option<usize>,

        /// RNG seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,

        /// Print only the summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print the loaded symbol catalog
    Catalog,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MachineConfig::load(path)
            .with_context(|| format!("loading machine config {}", path.display()))?,
        None => MachineConfig::default(),
    };
    let catalog = match &cli.catalog {
        Some(path) => SymbolCatalog::load(path)
            .with_context(|| format!("loading symbol catalog {}", path.display()))?,
        None => SymbolCatalog::classic()?,
    };
    let catalog = install_global(catalog)?;

    match cli.command {
        Commands::Play {
            bet,
            spins,
            player,
            reels,
            rows,
            seed,
            quiet,
        } => {
            let spin = SpinConfig::new(
                reels.unwrap_or(config.spin.num_reels),
                rows.unwrap_or(config.spin.visible_rows),
            );
            play(&config, catalog, PlayArgs {
                bet,
                spins,
                player,
                spin,
                seed: seed.or(config.seed),
                quiet,
            })
        }
        Commands::Catalog => print_catalog(&catalog),
    }
}

struct PlayArgs {
    bet: Decimal,
    spins: u32,
    player: String,
    spin: SpinConfig,
    seed: Option<u64>,
    quiet: bool,
}

fn play(config: &MachineConfig, catalog: Arc<SymbolCatalog>, args: PlayArgs) -> Result<()> {
    if args.spins == 0 {
        bail!("--spins must be at least 1");
    }

    let store = Arc::new(MemorySpinStore::new());
    store.open_account(&args.player, config.starting_balance);

    let reels = match args.seed {
        Some(seed) => ReelGenerator::seeded(Arc::clone(&catalog), seed),
        None => ReelGenerator::new(Arc::clone(&catalog)),
    };
    let mut machine = SlotMachine::from_config(config, reels, catalog, store);

    log::info!(
        "Playing {} spins of {} on {}×{} for {}",
        args.spins,
        args.bet,
        args.spin.num_reels,
        args.spin.visible_rows,
        args.player
    );

    let mut stats = SessionStats::new();
    for _ in 0..args.spins {
        let outcome = machine.play_spin(&args.player, args.bet, Some(args.spin));
        stats.record(&outcome, args.bet);
        if !args.quiet {
            println!("{}", serde_json::to_string(&outcome)?);
        }
        // Out of funds
        if outcome.error_code.as_deref() == Some("insufficient_balance") {
            log::warn!("{} ran out of balance", args.player);
            break;
        }
    }

    let account = machine.account(&args.player)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    let rtp = stats
        .rtp()
        .map_or_else(|| "n/a".to_string(), |rtp| format!("{rtp:.2}%"));
    println!(
        "spins: {}  rtp: {rtp}  hit rate: {:.2}%  balance: {}",
        stats.total_spins,
        stats.hit_rate(),
        account.balance
    );
    Ok(())
}

fn print_catalog(catalog: &SymbolCatalog) -> Result<()> {
    let total = catalog.total_weight();
    println!("{:<12} {:>8} {:>8} {:>10}", "symbol", "weight", "chance", "multiplier");
    for symbol in catalog.symbols() {
        println!(
            "{:<12} {:>8.2} {:>7.2}% {:>10}",
            symbol.name,
            symbol.weight,
            symbol.weight / total * 100.0,
            symbol.payout_multiplier
        );
    }
    Ok(())
}
