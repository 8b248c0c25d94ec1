use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("board has no rows")]
    Empty,

    #[error("board of {0} rows is too large")]
    TooLarge(usize),

    #[error("row {row} has {len} values, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("cell {row}-{col} is zero; soup values are positive")]
    ZeroCell { row: usize, col: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}
