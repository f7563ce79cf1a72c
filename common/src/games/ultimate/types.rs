use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    First,
    Second,
}

impl Mark {
    pub fn opponent(&self) -> Mark {
        match self {
            Mark::First => Mark::Second,
            Mark::Second => Mark::First,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Mark::First => 'X',
            Mark::Second => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

pub type Cell = Option<Mark>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubResult {
    #[default]
    Undetermined,
    Won(Mark),
    Drawn,
}

impl SubResult {
    pub fn is_decided(&self) -> bool {
        !matches!(self, SubResult::Undetermined)
    }

    pub fn winner(&self) -> Option<Mark> {
        match self {
            SubResult::Won(mark) => Some(*mark),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameResult {
    #[default]
    InProgress,
    Won(Mark),
    Drawn,
}

impl GameResult {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameResult::InProgress)
    }

    pub fn winner(&self) -> Option<Mark> {
        match self {
            GameResult::Won(mark) => Some(*mark),
            _ => None,
        }
    }
}

/// A target square: the sub-board to play in and the cell inside it, both
/// row-major indices in `0..9`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub sub_board: usize,
    pub cell: usize,
}

impl Move {
    pub fn new(sub_board: usize, cell: usize) -> Self {
        Self { sub_board, cell }
    }

    pub fn is_in_bounds(&self) -> bool {
        self.sub_board < BOARD_SIZE && self.cell < BOARD_SIZE
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.sub_board, self.cell)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub sub_board: usize,
    pub cell: usize,
    pub mark: Mark,
}

impl MoveRecord {
    pub fn as_move(&self) -> Move {
        Move::new(self.sub_board, self.cell)
    }
}
