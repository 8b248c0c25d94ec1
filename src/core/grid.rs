use crate::error::GridError;
use crate::prng::RandomSource;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A `(row, col)` coordinate on a soup board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellRef {
    pub row: u8,
    pub col: u8,
}

impl CellRef {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl core::fmt::Display for CellRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Square board of positive integers. Values never change after generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: u8,
    cells: Vec<u32>,
}

impl Grid {
    /// Fill a `size`×`size` board with independent values in `[1, max_value]`.
    pub fn generate(size: u8, max_value: u32, rng: &mut impl RandomSource) -> Self {
        let size = size.max(1);
        let max_value = max_value.max(1);
        let n = (size as usize) * (size as usize);
        let cells = (0..n)
            .map(|_| rng.gen_range_inclusive(1, max_value))
            .collect();
        Self { size, cells }
    }

    /// Build a board from explicit rows (fixtures, replays).
    pub fn from_rows(rows: &[&[u32]]) -> Result<Self, GridError> {
        let size = rows.len();
        if size == 0 {
            return Err(GridError::Empty);
        }
        let size_u8 = u8::try_from(size).map_err(|_| GridError::TooLarge(size))?;

        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            if let Some(col) = values.iter().position(|&v| v == 0) {
                return Err(GridError::ZeroCell { row, col });
            }
            cells.extend_from_slice(values);
        }

        Ok(Self {
            size: size_u8,
            cells,
        })
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    /// Value at `cell`, or `None` outside the board.
    pub fn value(&self, cell: CellRef) -> Option<u32> {
        if !self.contains(cell) {
            return None;
        }
        Some(self.cells[self.idx(cell)])
    }

    pub(crate) fn idx(&self, cell: CellRef) -> usize {
        (cell.row as usize) * (self.size as usize) + (cell.col as usize)
    }

    pub(crate) fn cell_at(&self, idx: usize) -> CellRef {
        let size = self.size as usize;
        CellRef::new((idx / size) as u8, (idx % size) as u8)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.size as usize)
    }

    pub fn values(&self) -> &[u32] {
        &self.cells
    }
}
