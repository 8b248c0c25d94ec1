use hashbrown::HashSet;

use crate::grid::{CellRef, Grid};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How selected values combine into the number compared against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "rule", rename_all = "snake_case"))]
pub enum Rule {
    /// `a + b`, exactly two cells.
    Addition,
    /// `|a - b|`, exactly two cells.
    Subtraction,
    /// Sum of 2..=`max_cells` cells.
    MultiSum { max_cells: u8 },
}

impl Rule {
    pub fn min_cells(self) -> usize {
        2
    }

    pub fn max_cells(self) -> usize {
        match self {
            Rule::Addition | Rule::Subtraction => 2,
            Rule::MultiSum { max_cells } => (max_cells as usize).max(2),
        }
    }

    pub fn accepts_arity(self, n: usize) -> bool {
        (self.min_cells()..=self.max_cells()).contains(&n)
    }

    /// Aggregate of `values`, or `None` when the count does not fit the rule.
    pub fn aggregate(self, values: &[u32]) -> Option<u32> {
        if !self.accepts_arity(values.len()) {
            return None;
        }
        match self {
            Rule::Addition | Rule::MultiSum { .. } => {
                Some(values.iter().fold(0u32, |acc, &v| acc.saturating_add(v)))
            }
            Rule::Subtraction => Some(values[0].abs_diff(values[1])),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Rule::Addition | Rule::MultiSum { .. } => "+",
            Rule::Subtraction => "-",
        }
    }
}

/// Order-independent identity of a set of cells.
///
/// Keyed by coordinates, never by values: two different cells holding the
/// same number make different combinations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComboKey(Vec<CellRef>);

impl ComboKey {
    pub fn new(cells: &[CellRef]) -> Self {
        let mut cells = cells.to_vec();
        cells.sort_unstable();
        cells.dedup();
        Self(cells)
    }

    pub fn cells(&self) -> &[CellRef] {
        &self.0
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        self.0.binary_search(&cell).is_ok()
    }
}

impl core::fmt::Display for ComboKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Result of combining a selection under a rule, before any bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub aggregate: u32,
    pub matched: bool,
}

/// Combine the values under `cells`. `None` if a cell is off the board or the
/// arity does not fit the rule.
pub fn assess(grid: &Grid, rule: Rule, target: u32, cells: &[CellRef]) -> Option<Assessment> {
    let mut values = Vec::with_capacity(cells.len());
    for &c in cells {
        values.push(grid.value(c)?);
    }
    let aggregate = rule.aggregate(&values)?;
    Some(Assessment {
        aggregate,
        matched: aggregate == target,
    })
}

/// Credited combinations plus the consumed-cell map derived from them.
#[derive(Debug, Clone)]
pub struct FoundSet {
    order: Vec<ComboKey>,
    seen: HashSet<ComboKey>,
    consumed: Vec<bool>,
    board_size: u8,
}

impl FoundSet {
    pub fn new(board_size: u8) -> Self {
        let n = (board_size as usize) * (board_size as usize);
        Self {
            order: Vec::new(),
            seen: HashSet::new(),
            consumed: vec![false; n],
            board_size,
        }
    }

    /// Record `key`. Returns `false` (and changes nothing) if it was already
    /// credited.
    pub fn credit(&mut self, key: ComboKey) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        for &c in key.cells() {
            if let Some(slot) = self.slot(c) {
                self.consumed[slot] = true;
            }
        }
        self.seen.insert(key.clone());
        self.order.push(key);
        true
    }

    pub fn contains(&self, key: &ComboKey) -> bool {
        self.seen.contains(key)
    }

    pub fn is_consumed(&self, cell: CellRef) -> bool {
        self.slot(cell).map(|i| self.consumed[i]).unwrap_or(false)
    }

    pub(crate) fn consumed_map(&self) -> &[bool] {
        &self.consumed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in the order they were credited.
    pub fn keys(&self) -> &[ComboKey] {
        &self.order
    }

    fn slot(&self, cell: CellRef) -> Option<usize> {
        if cell.row >= self.board_size || cell.col >= self.board_size {
            return None;
        }
        Some((cell.row as usize) * (self.board_size as usize) + (cell.col as usize))
    }
}
