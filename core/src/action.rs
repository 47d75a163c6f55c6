//! Actions — the full vocabulary an agent can emit in one tick.
//!
//! Every action also has a stable integer id (0..=11). The id space
//! is the wire format for scripted steps and the sample space for
//! random mode; it is append-only and never reordered.

use crate::market::Good;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::South, Direction::East, Direction::West];

    /// Movement delta. North is +y.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Stay,
    Move { direction: Direction },
    Buy { good: Good },
    Sell { good: Good },
    Produce,
}

impl Action {
    /// Random mode draws ids uniformly from [0, 10] — every action
    /// except Produce, which only the policy emits deliberately.
    pub const RANDOM_ID_SPAN: u64 = 11;

    /// Decode a stable action id. Ids 0..=11; anything else is None.
    pub fn from_id(id: u64) -> Option<Action> {
        match id {
            0 => Some(Action::Stay),
            1 => Some(Action::Move { direction: Direction::North }),
            2 => Some(Action::Move { direction: Direction::South }),
            3 => Some(Action::Move { direction: Direction::East }),
            4 => Some(Action::Move { direction: Direction::West }),
            5 => Some(Action::Buy { good: Good::Food }),
            6 => Some(Action::Sell { good: Good::Food }),
            7 => Some(Action::Buy { good: Good::Ore }),
            8 => Some(Action::Sell { good: Good::Ore }),
            9 => Some(Action::Buy { good: Good::Tools }),
            10 => Some(Action::Sell { good: Good::Tools }),
            11 => Some(Action::Produce),
            _ => None,
        }
    }
}
