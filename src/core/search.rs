//! Depth-first search for a combination that still scores on a board.
//!
//! Boards are at most 10×10 and combinations at most four cells, so a plain
//! DFS with sum pruning is enough.

use crate::combo::{ComboKey, FoundSet, Rule};
use crate::grid::{CellRef, Grid};

/// First combination (in row-major order) of available cells whose aggregate
/// under `rule` equals `target`, or `None` if the board has none left.
pub fn find_combination(grid: &Grid, rule: Rule, target: u32, found: &FoundSet) -> Option<ComboKey> {
    let available: Vec<(CellRef, u32)> = grid
        .values()
        .iter()
        .enumerate()
        .filter(|&(i, _)| !found.consumed_map().get(i).copied().unwrap_or(false))
        .map(|(i, &v)| (grid.cell_at(i), v))
        .collect();

    match rule {
        Rule::Subtraction => find_difference(&available, target),
        Rule::Addition | Rule::MultiSum { .. } => {
            let mut stack = Vec::with_capacity(rule.max_cells());
            if dfs_sum(&available, 0, 0, target, rule, &mut stack) {
                let cells: Vec<CellRef> = stack.iter().map(|&i| available[i].0).collect();
                Some(ComboKey::new(&cells))
            } else {
                None
            }
        }
    }
}

/// Number of distinct combinations still available. Only used for
/// diagnostics, it enumerates everything.
pub fn count_combinations(grid: &Grid, rule: Rule, target: u32, found: &FoundSet) -> usize {
    let available: Vec<u32> = grid
        .values()
        .iter()
        .enumerate()
        .filter(|&(i, _)| !found.consumed_map().get(i).copied().unwrap_or(false))
        .map(|(_, &v)| v)
        .collect();

    match rule {
        Rule::Subtraction => {
            let mut n = 0;
            for i in 0..available.len() {
                for j in (i + 1)..available.len() {
                    if available[i].abs_diff(available[j]) == target {
                        n += 1;
                    }
                }
            }
            n
        }
        Rule::Addition | Rule::MultiSum { .. } => {
            count_sum(&available, 0, 0, 0, target, rule.min_cells(), rule.max_cells())
        }
    }
}

fn find_difference(available: &[(CellRef, u32)], target: u32) -> Option<ComboKey> {
    for (i, &(a, va)) in available.iter().enumerate() {
        for &(b, vb) in &available[(i + 1)..] {
            if va.abs_diff(vb) == target {
                return Some(ComboKey::new(&[a, b]));
            }
        }
    }
    None
}

fn dfs_sum(
    available: &[(CellRef, u32)],
    start: usize,
    sum: u32,
    target: u32,
    rule: Rule,
    stack: &mut Vec<usize>,
) -> bool {
    if sum == target && rule.accepts_arity(stack.len()) {
        return true;
    }
    if stack.len() >= rule.max_cells() {
        return false;
    }
    for i in start..available.len() {
        let next = sum.saturating_add(available[i].1);
        // Values are positive, so overshooting never recovers.
        if next > target {
            continue;
        }
        stack.push(i);
        if dfs_sum(available, i + 1, next, target, rule, stack) {
            return true;
        }
        stack.pop();
    }
    false
}

fn count_sum(
    available: &[u32],
    start: usize,
    depth: usize,
    sum: u32,
    target: u32,
    min: usize,
    max: usize,
) -> usize {
    let mut n = 0;
    if sum == target && depth >= min {
        // Positive values: extending a hit can only overshoot.
        return 1;
    }
    if depth >= max {
        return 0;
    }
    for i in start..available.len() {
        let next = sum.saturating_add(available[i]);
        if next > target {
            continue;
        }
        n += count_sum(available, i + 1, depth + 1, next, target, min, max);
    }
    n
}
