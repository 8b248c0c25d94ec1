//! Puzzle and drill logic for the Gnosis kids' math games.
//!
//! The number-soup engine lives in [`soup`]; arithmetic drills in [`quiz`];
//! the shared star currency in [`stars`]. Nothing here renders or plays
//! audio; front ends drive these types through plain method calls.

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/grid.rs"]
pub mod grid;

#[path = "core/selection.rs"]
pub mod selection;

#[path = "core/combo.rs"]
pub mod combo;

#[path = "core/search.rs"]
pub mod search;

#[path = "core/soup.rs"]
pub mod soup;

#[path = "core/quiz.rs"]
pub mod quiz;

#[path = "core/stars.rs"]
pub mod stars;

pub use grid::{CellRef, Grid};
pub use prng::{Prng, RandomSource};
pub use soup::{Difficulty, Outcome, Phase, Session, SoupConfig, Variant};
