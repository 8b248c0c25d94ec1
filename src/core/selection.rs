use crate::grid::CellRef;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a toggle request did. None of these are failures; the renderer
/// decides whether to flash, shake or ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Toggle {
    Selected,
    Deselected,
    /// Selection already holds the maximum number of cells.
    Full,
    /// Cell belongs to a credited combination.
    Consumed,
    OutOfBounds,
    /// Session is complete; only a restart accepts input again.
    Finished,
}

impl Toggle {
    pub fn changed(self) -> bool {
        matches!(self, Toggle::Selected | Toggle::Deselected)
    }
}

/// Ordered working set of at most `capacity` cells.
///
/// Bounds and consumed checks live in the session, which knows the board;
/// this type only enforces membership and the soft cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    cells: Vec<CellRef>,
    capacity: usize,
}

impl Selection {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            cells: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn toggle(&mut self, cell: CellRef) -> Toggle {
        if let Some(i) = self.cells.iter().position(|&c| c == cell) {
            self.cells.remove(i);
            return Toggle::Deselected;
        }
        if self.cells.len() >= self.capacity {
            return Toggle::Full;
        }
        self.cells.push(cell);
        Toggle::Selected
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        self.cells.contains(&cell)
    }

    pub fn cells(&self) -> &[CellRef] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}
