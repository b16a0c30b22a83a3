//! Win lines and run detection

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{MIN_MATCHING_SYMBOLS, SpinConfig};
use crate::reels::ReelResult;
use crate::runs::find_longest_sequence;

/// Family of lines a detector evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinStrategy {
    /// One line per visible row
    Horizontal,
    /// Main and anti diagonal starting from the top row
    Diagonal,
}

impl WinStrategy {
    /// Lines this strategy contributes for a grid shape
    pub fn lines(&self, config: &SpinConfig) -> Vec<WinLine> {
        match self {
            WinStrategy::Horizontal => (1..=config.visible_rows).map(WinLine::Row).collect(),
            WinStrategy::Diagonal => vec![WinLine::MainDiagonal, WinLine::AntiDiagonal],
        }
    }

    /// Scan every line of this strategy
    pub fn check_wins(&self, result: &ReelResult, min_run: usize) -> WinData {
        let lines = self
            .lines(&result.config())
            .into_iter()
            .filter_map(|line| scan_line(result, line, min_run))
            .collect();
        WinData::from_lines(lines)
    }
}

/// A single evaluated line on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinLine {
    /// Horizontal row, 1 = top
    Row(usize),
    /// Top-left towards bottom-right
    MainDiagonal,
    /// Top-right towards bottom-left
    AntiDiagonal,
}

impl WinLine {
    /// Grid cells `(reel, row)` along this line, in traversal order
    pub fn cells(&self, config: &SpinConfig) -> Vec<(usize, usize)> {
        let diagonal_len = config.num_reels.min(config.visible_rows);
        match *self {
            WinLine::Row(row) if (1..=config.visible_rows).contains(&row) => {
                (0..config.num_reels).map(|reel| (reel, row - 1)).collect()
            }
            WinLine::Row(_) => Vec::new(),
            WinLine::MainDiagonal => (0..diagonal_len).map(|i| (i, i)).collect(),
            WinLine::AntiDiagonal => (0..diagonal_len)
                .map(|i| (config.num_reels - 1 - i, i))
                .collect(),
        }
    }
}

impl fmt::Display for WinLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinLine::Row(row) => write!(f, "row {row}"),
            WinLine::MainDiagonal => write!(f, "main diagonal"),
            WinLine::AntiDiagonal => write!(f, "anti diagonal"),
        }
    }
}

/// Longest qualifying run of one symbol on a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinRun {
    pub symbol: String,
    /// Reel indices covered by the run, in line order
    pub indices: Vec<usize>,
}

impl WinRun {
    pub fn new(symbol: impl Into<String>, indices: Vec<usize>) -> Self {
        Self {
            symbol: symbol.into(),
            indices,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// All qualifying runs on one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    pub line: WinLine,
    pub runs: Vec<WinRun>,
}

/// Outcome of win detection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "lines", rename_all = "snake_case")]
pub enum WinData {
    #[default]
    NoWin,
    /// Non-empty, sorted by line, one entry per line
    Wins(Vec<LineWin>),
}

impl WinData {
    /// Normalize a set of line wins; empty input is `NoWin`
    pub fn from_lines(lines: Vec<LineWin>) -> Self {
        let mut merged: Vec<LineWin> = Vec::with_capacity(lines.len());
        for line_win in lines {
            if line_win.runs.is_empty() {
                continue;
            }
            match merged.iter_mut().find(|m| m.line == line_win.line) {
                Some(existing) => {
                    for run in line_win.runs {
                        merge_run(&mut existing.runs, run);
                    }
                }
                None => merged.push(line_win),
            }
        }

        if merged.is_empty() {
            return WinData::NoWin;
        }
        merged.sort_by_key(|m| m.line);
        WinData::Wins(merged)
    }

    /// Union of two results, line by line
    pub fn merge(self, other: WinData) -> WinData {
        match (self, other) {
            (WinData::NoWin, other) => other,
            (this, WinData::NoWin) => this,
            (WinData::Wins(mut a), WinData::Wins(b)) => {
                a.extend(b);
                WinData::from_lines(a)
            }
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, WinData::Wins(_))
    }

    pub fn lines(&self) -> &[LineWin] {
        match self {
            WinData::NoWin => &[],
            WinData::Wins(lines) => lines,
        }
    }

    pub fn get(&self, line: WinLine) -> Option<&LineWin> {
        self.lines().iter().find(|l| l.line == line)
    }

    /// Every run paired with its line
    pub fn runs(&self) -> impl Iterator<Item = (WinLine, &WinRun)> {
        self.lines()
            .iter()
            .flat_map(|l| l.runs.iter().map(move |run| (l.line, run)))
    }

    pub fn run_count(&self) -> usize {
        self.lines().iter().map(|l| l.runs.len()).sum()
    }
}

/// Keep the longer run when a symbol already has one on this line
fn merge_run(runs: &mut Vec<WinRun>, run: WinRun) {
    match runs.iter_mut().find(|r| r.symbol == run.symbol) {
        Some(existing) if run.len() > existing.len() => *existing = run,
        Some(_) => {}
        None => runs.push(run),
    }
}

fn scan_line(result: &ReelResult, line: WinLine, min_run: usize) -> Option<LineWin> {
    let cells = line.cells(&result.config());
    if cells.len() < min_run {
        return None;
    }

    let symbols: Vec<&str> = cells
        .iter()
        .filter_map(|&(reel, row)| result.symbol_at(reel, row))
        .collect();

    let mut seen: Vec<&str> = Vec::new();
    let mut runs = Vec::new();
    for &symbol in &symbols {
        if seen.contains(&symbol) {
            continue;
        }
        seen.push(symbol);

        let positions: Vec<usize> = symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == symbol)
            .map(|(pos, _)| pos)
            .collect();
        if positions.len() < min_run {
            continue;
        }

        let longest = find_longest_sequence(&positions);
        if longest.len() >= min_run {
            let indices = longest.iter().map(|&pos| cells[pos].0).collect();
            runs.push(WinRun::new(symbol, indices));
        }
    }

    (!runs.is_empty()).then_some(LineWin { line, runs })
}

/// Composite detector running several strategies and merging by line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinDetector {
    strategies: Vec<WinStrategy>,
    min_run: usize,
}

impl WinDetector {
    pub fn new(strategies: Vec<WinStrategy>) -> Self {
        let mut unique = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            if !unique.contains(&strategy) {
                unique.push(strategy);
            }
        }
        Self {
            strategies: unique,
            min_run: MIN_MATCHING_SYMBOLS,
        }
    }

    /// Rows only
    pub fn horizontal() -> Self {
        Self::new(vec![WinStrategy::Horizontal])
    }

    /// Set shortest qualifying run
    pub fn with_min_run(mut self, min_run: usize) -> Self {
        self.min_run = min_run.max(1);
        self
    }

    pub fn strategies(&self) -> &[WinStrategy] {
        &self.strategies
    }

    pub fn min_run(&self) -> usize {
        self.min_run
    }

    /// Find every qualifying run on the grid
    pub fn check_wins(&self, result: &ReelResult) -> WinData {
        self.strategies
            .iter()
            .map(|strategy| strategy.check_wins(result, self.min_run))
            .fold(WinData::NoWin, WinData::merge)
    }
}

impl Default for WinDetector {
    fn default() -> Self {
        Self::new(vec![WinStrategy::Horizontal, WinStrategy::Diagonal])
    }
}
