use thiserror::Error;

use super::board::Board;
use super::types::{GameResult, Mark, Move, MoveRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("game is already over")]
    GameOver,

    #[error("square {sub_board}/{cell} is outside the board")]
    OutOfBounds { sub_board: usize, cell: usize },

    #[error("must play in sub-board {expected}, not {requested}")]
    WrongSubBoard { expected: usize, requested: usize },

    #[error("sub-board {sub_board} is already decided")]
    SubBoardClosed { sub_board: usize },

    #[error("cell {cell} of sub-board {sub_board} is already marked")]
    CellOccupied { sub_board: usize, cell: usize },

    #[error("not your turn")]
    NotYourTurn,

    #[error("opponent is not connected")]
    NotConnected,
}

/// Everything the rules need to judge and apply a move. Kept `Copy` so the
/// search can explore children as plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    board: Board,
    current_player: Mark,
    active_sub_board: Option<usize>,
    result: GameResult,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Mark::First,
            active_sub_board: None,
            result: GameResult::InProgress,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    pub fn active_sub_board(&self) -> Option<usize> {
        self.active_sub_board
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    #[cfg(test)]
    pub(crate) fn from_parts(board: Board, current_player: Mark, active_sub_board: Option<usize>) -> Self {
        Self {
            board,
            current_player,
            active_sub_board,
            result: board.meta_result(),
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.result.is_over() {
            return Vec::new();
        }
        self.board.available_moves(self.active_sub_board)
    }

    pub fn check_move(&self, mv: Move) -> Result<(), MoveError> {
        if self.result.is_over() {
            return Err(MoveError::GameOver);
        }

        if !mv.is_in_bounds() {
            return Err(MoveError::OutOfBounds {
                sub_board: mv.sub_board,
                cell: mv.cell,
            });
        }

        if let Some(expected) = self.active_sub_board
            && expected != mv.sub_board
        {
            return Err(MoveError::WrongSubBoard {
                expected,
                requested: mv.sub_board,
            });
        }

        if self.board.result(mv.sub_board).is_decided() {
            return Err(MoveError::SubBoardClosed {
                sub_board: mv.sub_board,
            });
        }

        if self.board.sub_board(mv.sub_board).cell(mv.cell).is_some() {
            return Err(MoveError::CellOccupied {
                sub_board: mv.sub_board,
                cell: mv.cell,
            });
        }

        Ok(())
    }

    pub fn play(&self, mv: Move) -> Result<Position, MoveError> {
        self.check_move(mv)?;

        let mut next = *self;
        let decided = next.board.place(mv, self.current_player);
        if decided {
            next.result = next.board.meta_result();
        }

        next.active_sub_board = next.board.is_playable(mv.cell).then_some(mv.cell);
        next.current_player = self.current_player.opponent();

        Ok(next)
    }
}

/// The live state of one match: the current position plus the append-only
/// log of accepted moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    position: Position,
    move_log: Vec<MoveRecord>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn board(&self) -> &Board {
        self.position.board()
    }

    pub fn current_player(&self) -> Mark {
        self.position.current_player()
    }

    pub fn active_sub_board(&self) -> Option<usize> {
        self.position.active_sub_board()
    }

    pub fn result(&self) -> GameResult {
        self.position.result()
    }

    pub fn move_log(&self) -> &[MoveRecord] {
        &self.move_log
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.move_log.last()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves()
    }

    /// Applies a move and returns the successor state. The receiver is left
    /// untouched whether the move is accepted or rejected.
    pub fn apply_move(&self, mv: Move) -> Result<GameState, MoveError> {
        let position = self.position.play(mv)?;

        let mut move_log = Vec::with_capacity(self.move_log.len() + 1);
        move_log.extend_from_slice(&self.move_log);
        move_log.push(MoveRecord {
            sub_board: mv.sub_board,
            cell: mv.cell,
            mark: self.position.current_player(),
        });

        Ok(GameState { position, move_log })
    }

    /// Rebuilds a state by replaying a move log from the empty board.
    pub fn replay(moves: &[Move]) -> Result<GameState, MoveError> {
        moves
            .iter()
            .try_fold(GameState::new(), |state, &mv| state.apply_move(mv))
    }
}

pub fn apply_move(state: &GameState, sub_board: usize, cell: usize) -> Result<GameState, MoveError> {
    state.apply_move(Move::new(sub_board, cell))
}
