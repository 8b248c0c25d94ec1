//! Number soup: find cells on a board whose values combine to a target.
//!
//! A [`Session`] owns one board and moves through `Playing -> Complete`.
//! Randomness is passed in on every (re)generation so callers decide the
//! seed, and the star store is passed to [`Session::settle`] so the puzzle
//! never touches global state.

use tracing::{debug, info};

use crate::combo::{assess, ComboKey, FoundSet, Rule};
use crate::error::StoreError;
use crate::grid::{CellRef, Grid};
use crate::prng::RandomSource;
use crate::search;
use crate::selection::{Selection, Toggle};
use crate::stars::{self, KeyValueStore};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_name(v: &str) -> Option<Self> {
        match v.trim().to_ascii_lowercase().as_str() {
            "easy" | "facil" | "fácil" => Some(Difficulty::Easy),
            "medium" | "medio" => Some(Difficulty::Medium),
            "hard" | "dificil" | "difícil" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Variant {
    /// Two cells that add up to the target.
    PairAddition,
    /// Two cells whose difference is the target.
    PairSubtraction,
    /// Two to four cells that add up to the target.
    Advanced(Difficulty),
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::PairAddition => "pair_addition",
            Variant::PairSubtraction => "pair_subtraction",
            Variant::Advanced(Difficulty::Easy) => "advanced_easy",
            Variant::Advanced(Difficulty::Medium) => "advanced_medium",
            Variant::Advanced(Difficulty::Hard) => "advanced_hard",
        }
    }

    pub fn config(self) -> SoupConfig {
        match self {
            Variant::PairAddition => SoupConfig {
                grid_size: 6,
                max_value: 9,
                target: 12,
                goal: 8,
                rule: Rule::Addition,
                points_per_combo: 1,
                points_per_star: 1,
            },
            Variant::PairSubtraction => SoupConfig {
                target: 5,
                rule: Rule::Subtraction,
                ..Variant::PairAddition.config()
            },
            Variant::Advanced(d) => {
                let (grid_size, max_value, target, goal) = match d {
                    Difficulty::Easy => (6, 15, 20, 8),
                    Difficulty::Medium => (8, 25, 50, 10),
                    Difficulty::Hard => (10, 50, 100, 12),
                };
                SoupConfig {
                    grid_size,
                    max_value,
                    target,
                    goal,
                    rule: Rule::MultiSum { max_cells: 4 },
                    points_per_combo: 10,
                    points_per_star: 10,
                }
            }
        }
    }
}

/// Parameters of one soup session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoupConfig {
    pub grid_size: u8,
    pub max_value: u32,
    pub target: u32,
    /// Distinct combinations needed to finish.
    pub goal: usize,
    pub rule: Rule,
    pub points_per_combo: u32,
    pub points_per_star: u32,
}

impl Default for SoupConfig {
    fn default() -> Self {
        Variant::PairAddition.config()
    }
}

/// Optional per-field replacements for a variant's built-in parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SoupOverrides {
    pub grid_size: Option<u8>,
    pub max_value: Option<u32>,
    pub target: Option<u32>,
    pub goal: Option<usize>,
}

impl SoupOverrides {
    pub fn apply(&self, base: SoupConfig) -> SoupConfig {
        SoupConfig {
            grid_size: self.grid_size.unwrap_or(base.grid_size).clamp(2, 16),
            max_value: self.max_value.unwrap_or(base.max_value).max(1),
            target: self.target.unwrap_or(base.target),
            goal: self.goal.unwrap_or(base.goal).max(1),
            ..base
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    Playing,
    Complete,
}

/// Result of an evaluation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New combination credited. `completed` is true on the one evaluation
    /// that reaches the goal.
    Credited {
        key: ComboKey,
        aggregate: u32,
        completed: bool,
    },
    /// Right number, but these exact cells already scored.
    ///
    /// Consumed cells cannot be toggled, so a session normally never gets
    /// here; the branch keeps crediting idempotent regardless of how the
    /// selection was built.
    AlreadyFound { aggregate: u32 },
    Mismatch { aggregate: u32 },
    /// Too few cells selected; nothing was evaluated and the selection is kept.
    Incomplete,
    /// Session is complete; restart to play again.
    Finished,
}

impl Outcome {
    pub fn is_credit(&self) -> bool {
        matches!(self, Outcome::Credited { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SoupConfig,
    grid: Grid,
    selection: Selection,
    found: FoundSet,
    phase: Phase,
    stars_deposited: u64,
}

impl Session {
    /// Generate a fresh board for `config`.
    pub fn new(config: SoupConfig, rng: &mut impl RandomSource) -> Self {
        let grid = Grid::generate(config.grid_size, config.max_value, rng);
        Self::from_grid(config, grid)
    }

    /// Start a session on an existing board. The board's size wins over
    /// `config.grid_size`.
    pub fn from_grid(mut config: SoupConfig, grid: Grid) -> Self {
        config.grid_size = grid.size();
        Self {
            selection: Selection::new(config.rule.max_cells()),
            found: FoundSet::new(grid.size()),
            phase: Phase::Playing,
            stars_deposited: 0,
            grid,
            config,
        }
    }

    /// Throw the board away and deal a new one. Earned stars that were not
    /// settled are forfeited.
    pub fn reset(&mut self, rng: &mut impl RandomSource) {
        *self = Self::new(self.config, rng);
        debug!(size = self.config.grid_size, target = self.config.target, "soup board regenerated");
    }

    pub fn toggle(&mut self, cell: CellRef) -> Toggle {
        if self.phase == Phase::Complete {
            return Toggle::Finished;
        }
        if !self.grid.contains(cell) {
            return Toggle::OutOfBounds;
        }
        if self.found.is_consumed(cell) {
            return Toggle::Consumed;
        }
        self.selection.toggle(cell)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn evaluate(&mut self) -> Outcome {
        if self.phase == Phase::Complete {
            return Outcome::Finished;
        }
        if self.selection.len() < self.config.rule.min_cells() {
            return Outcome::Incomplete;
        }

        let cells = self.selection.cells().to_vec();
        self.selection.clear();

        // Selection only ever holds in-bounds cells within the rule's arity.
        let Some(a) = assess(&self.grid, self.config.rule, self.config.target, &cells) else {
            return Outcome::Incomplete;
        };

        if !a.matched {
            return Outcome::Mismatch {
                aggregate: a.aggregate,
            };
        }

        let key = ComboKey::new(&cells);
        if !self.found.credit(key.clone()) {
            return Outcome::AlreadyFound {
                aggregate: a.aggregate,
            };
        }
        debug!(combo = %key, score = self.score(), "combination credited");

        let completed = self.found.len() >= self.config.goal;
        if completed {
            self.phase = Phase::Complete;
            info!(score = self.score(), goal = self.config.goal, "soup complete");
        }

        Outcome::Credited {
            key,
            aggregate: a.aggregate,
            completed,
        }
    }

    /// Running aggregate of the current selection, if it has a valid arity.
    pub fn current_aggregate(&self) -> Option<u32> {
        assess(
            &self.grid,
            self.config.rule,
            self.config.target,
            self.selection.cells(),
        )
        .map(|a| a.aggregate)
    }

    /// A combination that would still score, if any.
    pub fn hint(&self) -> Option<ComboKey> {
        if self.phase == Phase::Complete {
            return None;
        }
        search::find_combination(&self.grid, self.config.rule, self.config.target, &self.found)
    }

    /// Playing, but no scoring combination is left on the board.
    pub fn is_stuck(&self) -> bool {
        self.phase == Phase::Playing && self.hint().is_none()
    }

    /// Deposit stars earned since the last settlement. Returns the new
    /// balance in the store.
    pub fn settle(&mut self, store: &mut dyn KeyValueStore) -> Result<u64, StoreError> {
        let earned = self.stars_earned();
        let pending = earned.saturating_sub(self.stars_deposited);
        let balance = stars::deposit_stars(store, pending)?;
        self.stars_deposited = earned;
        Ok(balance)
    }

    pub fn config(&self) -> &SoupConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn target(&self) -> u32 {
        self.config.target
    }

    pub fn goal(&self) -> usize {
        self.config.goal
    }

    pub fn selection(&self) -> &[CellRef] {
        self.selection.cells()
    }

    pub fn is_selected(&self, cell: CellRef) -> bool {
        self.selection.contains(cell)
    }

    pub fn is_consumed(&self, cell: CellRef) -> bool {
        self.found.is_consumed(cell)
    }

    pub fn found(&self) -> &[ComboKey] {
        self.found.keys()
    }

    /// Distinct combinations credited so far.
    pub fn score(&self) -> usize {
        self.found.len()
    }

    pub fn points(&self) -> u64 {
        self.score() as u64 * self.config.points_per_combo as u64
    }

    pub fn stars_earned(&self) -> u64 {
        self.points() / (self.config.points_per_star.max(1) as u64)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn snapshot(&self) -> SoupSnapshot {
        let size = self.grid.size();
        let mut consumed = Vec::with_capacity(self.grid.cell_count());
        for i in 0..self.grid.cell_count() {
            consumed.push(self.found.is_consumed(self.grid.cell_at(i)));
        }
        SoupSnapshot {
            size,
            values: self.grid.values().to_vec(),
            consumed,
            selected: self.selection.cells().to_vec(),
            current: self.current_aggregate(),
            target: self.config.target,
            score: self.score(),
            goal: self.config.goal,
            points: self.points(),
            phase: self.phase,
        }
    }
}

/// Everything a renderer needs for one frame, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoupSnapshot {
    pub size: u8,
    pub values: Vec<u32>,
    pub consumed: Vec<bool>,
    pub selected: Vec<CellRef>,
    pub current: Option<u32>,
    pub target: u32,
    pub score: usize,
    pub goal: usize,
    pub points: u64,
    pub phase: Phase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::Prng;
    use crate::stars::{KeyValueStore, MemoryStore, STARS_KEY};

    fn c(r: u8, col: u8) -> CellRef {
        CellRef::new(r, col)
    }

    fn pair_board() -> Grid {
        Grid::from_rows(&[
            &[5, 7, 9, 4, 6, 6],
            &[3, 9, 1, 8, 2, 2],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1],
        ])
        .unwrap()
    }

    #[test]
    fn matching_pair_scores_and_consumes() {
        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        assert_eq!(s.target(), 12);
        assert_eq!(s.toggle(c(0, 0)), Toggle::Selected);
        assert_eq!(s.toggle(c(0, 1)), Toggle::Selected);
        assert_eq!(s.current_aggregate(), Some(12));

        let out = s.evaluate();
        assert!(out.is_credit());
        assert_eq!(s.score(), 1);
        assert!(s.is_consumed(c(0, 0)));
        assert!(s.is_consumed(c(0, 1)));
        assert!(s.selection().is_empty());
        assert_eq!(s.found()[0].to_string(), "0-0,0-1");
    }

    #[test]
    fn consumed_cells_cannot_be_selected() {
        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        s.toggle(c(0, 0));
        s.toggle(c(0, 1));
        s.evaluate();

        assert_eq!(s.toggle(c(0, 0)), Toggle::Consumed);
        assert_eq!(s.toggle(c(0, 1)), Toggle::Consumed);
        assert!(s.selection().is_empty());
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn subtraction_uses_absolute_difference() {
        let mut s = Session::from_grid(Variant::PairSubtraction.config(), pair_board());
        assert_eq!(s.target(), 5);
        s.toggle(c(0, 3)); // 4
        s.toggle(c(0, 2)); // 9
        let out = s.evaluate();
        assert_eq!(
            out,
            Outcome::Credited {
                key: ComboKey::new(&[c(0, 2), c(0, 3)]),
                aggregate: 5,
                completed: false,
            }
        );
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn mismatch_only_clears_selection() {
        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        s.toggle(c(0, 0));
        s.toggle(c(1, 0));
        assert_eq!(s.evaluate(), Outcome::Mismatch { aggregate: 8 });
        assert_eq!(s.score(), 0);
        assert!(s.selection().is_empty());
        assert!(!s.is_consumed(c(0, 0)));
    }

    #[test]
    fn third_toggle_is_ignored_in_pair_mode() {
        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        s.toggle(c(0, 0));
        s.toggle(c(0, 1));
        assert_eq!(s.toggle(c(0, 2)), Toggle::Full);
        assert_eq!(s.selection().len(), 2);
    }

    #[test]
    fn short_selection_is_not_evaluated() {
        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        s.toggle(c(0, 0));
        assert_eq!(s.evaluate(), Outcome::Incomplete);
        assert_eq!(s.selection(), &[c(0, 0)]);
    }

    #[test]
    fn out_of_bounds_toggle_is_rejected() {
        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        assert_eq!(s.toggle(c(6, 0)), Toggle::OutOfBounds);
        assert!(s.selection().is_empty());
    }

    #[test]
    fn completes_exactly_at_goal() {
        let mut cfg = Variant::PairAddition.config();
        cfg.goal = 3;
        let mut s = Session::from_grid(cfg, pair_board());

        let mut history = vec![s.score()];
        // (0,0)+(0,1)=12, (0,4)+(0,5)=12, (0,2)+(1,0)=12
        for (a, b) in [(c(0, 0), c(0, 1)), (c(0, 4), c(0, 5)), (c(0, 2), c(1, 0))] {
            assert!(!s.is_complete());
            s.toggle(a);
            s.toggle(b);
            let out = s.evaluate();
            assert!(out.is_credit());
            history.push(s.score());
        }

        assert!(s.is_complete());
        assert_eq!(s.score(), 3);
        assert!(history.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(s.toggle(c(1, 1)), Toggle::Finished);
        assert_eq!(s.evaluate(), Outcome::Finished);
        assert_eq!(s.score(), 3);
        assert!(s.hint().is_none());
        assert!(!s.is_stuck());
    }

    #[test]
    fn board_without_combinations_is_stuck() {
        let ones: &[u32] = &[1, 1, 1, 1, 1, 1];
        let board = Grid::from_rows(&[ones, ones, ones, ones, ones, ones]).unwrap();
        let s = Session::from_grid(Variant::PairAddition.config(), board);
        assert_eq!(s.phase(), Phase::Playing);
        assert!(s.hint().is_none());
        assert!(s.is_stuck());
    }

    #[test]
    fn advanced_accepts_up_to_four_cells() {
        let board = Grid::from_rows(&[
            &[5, 5, 5, 5, 9, 9],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 1, 1, 1, 1],
        ])
        .unwrap();
        let mut s = Session::from_grid(Variant::Advanced(Difficulty::Easy).config(), board);
        assert_eq!(s.target(), 20);
        for col in 0..4 {
            assert_eq!(s.toggle(c(0, col)), Toggle::Selected);
        }
        assert_eq!(s.toggle(c(0, 4)), Toggle::Full);
        assert_eq!(s.current_aggregate(), Some(20));
        assert!(s.evaluate().is_credit());
        assert_eq!(s.points(), 10);
        assert_eq!(s.stars_earned(), 1);
    }

    #[test]
    fn reset_clears_progress() {
        let mut rng = Prng::new(11);
        let mut s = Session::new(Variant::PairAddition.config(), &mut rng);
        let key = s.hint().expect("fresh 6x6 board of 1..=9 has a pair summing to 12");
        for &cell in key.cells() {
            s.toggle(cell);
        }
        assert!(s.evaluate().is_credit());

        let before = s.grid().clone();
        s.reset(&mut rng);
        assert_eq!(s.score(), 0);
        assert!(s.found().is_empty());
        assert_eq!(s.phase(), Phase::Playing);
        assert_ne!(s.grid(), &before);
    }

    #[test]
    fn playing_hints_reaches_completion() {
        for variant in [
            Variant::PairAddition,
            Variant::PairSubtraction,
            Variant::Advanced(Difficulty::Medium),
        ] {
            let mut rng = Prng::new(2024);
            let mut s = Session::new(variant.config(), &mut rng);
            let mut guard = 0;
            while !s.is_complete() {
                let Some(key) = s.hint() else {
                    assert!(s.is_stuck());
                    s.reset(&mut rng);
                    guard += 1;
                    assert!(guard < 50, "{} never completed", variant.name());
                    continue;
                };
                for &cell in key.cells() {
                    assert_eq!(s.toggle(cell), Toggle::Selected);
                }
                assert!(s.evaluate().is_credit());
            }
            assert_eq!(s.score(), s.goal());
        }
    }

    #[test]
    fn settle_is_idempotent() {
        let mut store = MemoryStore::default();
        store.set(STARS_KEY, "4").unwrap();

        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        s.toggle(c(0, 0));
        s.toggle(c(0, 1));
        s.evaluate();

        assert_eq!(s.settle(&mut store).unwrap(), 5);
        assert_eq!(s.settle(&mut store).unwrap(), 5);

        s.toggle(c(0, 4));
        s.toggle(c(0, 5));
        s.evaluate();
        assert_eq!(s.settle(&mut store).unwrap(), 6);
        assert_eq!(store.get(STARS_KEY).as_deref(), Some("6"));
    }

    #[test]
    fn failed_settle_is_not_counted_twice() {
        use crate::stars::{star_balance, JsonFileStore};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stars.json");
        let mut store = JsonFileStore::open(&path).unwrap();

        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        s.toggle(c(0, 0));
        s.toggle(c(0, 1));
        s.evaluate();
        assert_eq!(s.stars_earned(), 1);

        let blocker = path.with_extension("json.tmp");
        std::fs::create_dir(&blocker).unwrap();
        assert!(s.settle(&mut store).is_err());
        std::fs::remove_dir(&blocker).unwrap();

        assert_eq!(s.settle(&mut store).unwrap(), 1);
        assert_eq!(star_balance(&JsonFileStore::open(&path).unwrap()), 1);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let o = SoupOverrides {
            goal: Some(3),
            ..Default::default()
        };
        let cfg = o.apply(Variant::Advanced(Difficulty::Hard).config());
        assert_eq!(cfg.goal, 3);
        assert_eq!(cfg.grid_size, 10);
        assert_eq!(cfg.target, 100);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut s = Session::from_grid(Variant::PairAddition.config(), pair_board());
        s.toggle(c(0, 0));
        s.toggle(c(0, 1));
        s.evaluate();
        s.toggle(c(1, 0));

        let snap = s.snapshot();
        assert_eq!(snap.size, 6);
        assert_eq!(snap.values.len(), 36);
        assert!(snap.consumed[0] && snap.consumed[1] && !snap.consumed[2]);
        assert_eq!(snap.selected, vec![c(1, 0)]);
        assert_eq!(snap.current, None);
        assert_eq!(snap.score, 1);
        assert_eq!(snap.phase, Phase::Playing);
    }
}
