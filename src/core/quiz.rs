//! Multiple-choice arithmetic drills, scaled by age group.

use tracing::debug;

use crate::error::StoreError;
use crate::prng::RandomSource;
use crate::stars::{self, KeyValueStore};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AgeGroup {
    #[cfg_attr(feature = "serde", serde(rename = "3-5"))]
    Toddler,
    #[cfg_attr(feature = "serde", serde(rename = "6-8"))]
    Early,
    #[cfg_attr(feature = "serde", serde(rename = "9-11"))]
    Middle,
}

impl AgeGroup {
    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Toddler => "3-5",
            AgeGroup::Early => "6-8",
            AgeGroup::Middle => "9-11",
        }
    }

    pub fn from_label(v: &str) -> Option<Self> {
        match v.trim() {
            "3-5" => Some(AgeGroup::Toddler),
            "6-8" => Some(AgeGroup::Early),
            "9-11" => Some(AgeGroup::Middle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }

    pub fn apply(self, a: i32, b: i32) -> Option<i32> {
        match self {
            Operation::Add => a.checked_add(b),
            Operation::Subtract => a.checked_sub(b),
            Operation::Multiply => a.checked_mul(b),
            Operation::Divide => {
                if b == 0 || a % b != 0 {
                    None
                } else {
                    Some(a / b)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Question {
    pub a: i32,
    pub b: i32,
    pub op: Operation,
    pub answer: i32,
    /// Four distinct choices, one of which is `answer`.
    pub options: [i32; 4],
}

impl Question {
    pub fn prompt(&self) -> String {
        format!("{} {} {}", self.a, self.op.symbol(), self.b)
    }

    pub fn is_correct(&self, choice: i32) -> bool {
        choice == self.answer
    }
}

fn range(rng: &mut impl RandomSource, low: i32, high: i32) -> i32 {
    rng.gen_range_inclusive(low as u32, high as u32) as i32
}

pub fn generate_question(age: AgeGroup, rng: &mut impl RandomSource) -> Question {
    let (a, b, op) = match age {
        AgeGroup::Toddler => (range(rng, 1, 5), range(rng, 1, 5), Operation::Add),
        AgeGroup::Early => {
            if rng.coin() {
                (range(rng, 1, 20), range(rng, 1, 20), Operation::Add)
            } else {
                let a = range(rng, 1, 20);
                (a, range(rng, 1, a), Operation::Subtract)
            }
        }
        AgeGroup::Middle => match rng.gen_index(4) {
            0 => (range(rng, 1, 12), range(rng, 1, 12), Operation::Multiply),
            1 => {
                let b = range(rng, 2, 11);
                let q = range(rng, 1, 10);
                (b * q, b, Operation::Divide)
            }
            2 => (range(rng, 1, 50), range(rng, 1, 50), Operation::Add),
            _ => {
                let a = range(rng, 20, 69);
                (a, range(rng, 1, a), Operation::Subtract)
            }
        },
    };

    // Operands are small and divisions are built exact.
    let answer = op.apply(a, b).unwrap_or_default();
    let mut options = [answer, answer + 1, answer - 1, answer + 2];
    rng.shuffle(&mut options);

    Question {
        a,
        b,
        op,
        answer,
        options,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Correct,
    /// Wrong choice; the same question stays up.
    Incorrect,
    /// The round is over.
    Finished,
}

/// A run of questions for one age group.
#[derive(Debug, Clone)]
pub struct QuizSession {
    age: AgeGroup,
    current: Question,
    rounds: Option<u32>,
    answered: u32,
    incorrect: u32,
    points: u64,
    stars_deposited: u64,
}

pub const POINTS_PER_CORRECT: u64 = 10;
pub const POINTS_PER_STAR: u64 = 10;

impl QuizSession {
    /// `rounds = None` keeps asking until the player leaves.
    pub fn new(age: AgeGroup, rounds: Option<u32>, rng: &mut impl RandomSource) -> Self {
        Self {
            age,
            current: generate_question(age, rng),
            rounds,
            answered: 0,
            incorrect: 0,
            points: 0,
            stars_deposited: 0,
        }
    }

    pub fn question(&self) -> &Question {
        &self.current
    }

    pub fn is_finished(&self) -> bool {
        self.rounds.is_some_and(|r| self.answered >= r)
    }

    pub fn answer(&mut self, choice: i32, rng: &mut impl RandomSource) -> Answer {
        if self.is_finished() {
            return Answer::Finished;
        }
        if !self.current.is_correct(choice) {
            self.incorrect += 1;
            return Answer::Incorrect;
        }
        self.points += POINTS_PER_CORRECT;
        self.answered += 1;
        debug!(age = self.age.label(), answered = self.answered, "quiz answer correct");
        if !self.is_finished() {
            self.current = generate_question(self.age, rng);
        }
        Answer::Correct
    }

    pub fn age(&self) -> AgeGroup {
        self.age
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn accuracy(&self) -> f32 {
        let total = self.answered + self.incorrect;
        if total == 0 {
            0.0
        } else {
            self.answered as f32 / total as f32
        }
    }

    pub fn stars_earned(&self) -> u64 {
        self.points / POINTS_PER_STAR
    }

    pub fn settle(&mut self, store: &mut dyn KeyValueStore) -> Result<u64, StoreError> {
        let earned = self.stars_earned();
        let balance = stars::deposit_stars(store, earned.saturating_sub(self.stars_deposited))?;
        self.stars_deposited = earned;
        Ok(balance)
    }
}
