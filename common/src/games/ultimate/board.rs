use super::types::{BOARD_SIZE, Cell, GameResult, Mark, Move, SubResult};
use super::win_detector::{META_EVALUATION_THRESHOLD, evaluate, evaluate_meta};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubBoard {
    cells: [Cell; BOARD_SIZE],
}

impl SubBoard {
    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| index)
    }

    fn place(&mut self, index: usize, mark: Mark) {
        self.cells[index] = Some(mark);
    }
}

/// The nine sub-boards together with their results. The whole thing is a
/// plain `Copy` value so search can branch without allocating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Board {
    sub_boards: [SubBoard; BOARD_SIZE],
    results: [SubResult; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from nine 9-character rows of `X`, `O` and `.`, one
    /// per sub-board.
    #[cfg(test)]
    pub(crate) fn from_notation(sub_boards: [&str; BOARD_SIZE]) -> Self {
        let mut board = Self::new();
        for (index, notation) in sub_boards.iter().enumerate() {
            for (cell, symbol) in notation.chars().enumerate() {
                board.sub_boards[index].cells[cell] = match symbol {
                    'X' => Some(Mark::First),
                    'O' => Some(Mark::Second),
                    _ => None,
                };
            }
            board.results[index] = evaluate(board.sub_boards[index].cells());
        }
        board
    }

    pub fn sub_board(&self, index: usize) -> &SubBoard {
        &self.sub_boards[index]
    }

    pub fn sub_boards(&self) -> &[SubBoard; BOARD_SIZE] {
        &self.sub_boards
    }

    pub fn result(&self, index: usize) -> SubResult {
        self.results[index]
    }

    pub fn results(&self) -> &[SubResult; BOARD_SIZE] {
        &self.results
    }

    pub fn decided_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_decided()).count()
    }

    /// A sub-board accepts moves while its result is open and it still has
    /// an empty cell.
    pub fn is_playable(&self, index: usize) -> bool {
        !self.results[index].is_decided() && !self.sub_boards[index].is_full()
    }

    pub fn playable_sub_boards(&self, active: Option<usize>) -> Vec<usize> {
        match active {
            Some(index) if self.is_playable(index) => vec![index],
            _ => (0..BOARD_SIZE).filter(|&i| self.is_playable(i)).collect(),
        }
    }

    pub fn available_moves(&self, active: Option<usize>) -> Vec<Move> {
        self.playable_sub_boards(active)
            .into_iter()
            .flat_map(|sub_board| {
                self.sub_boards[sub_board]
                    .empty_cells()
                    .map(move |cell| Move::new(sub_board, cell))
            })
            .collect()
    }

    /// Places a mark and re-derives the sub-board's result. Returns `true`
    /// when the placement decided that sub-board. Callers check legality.
    pub(crate) fn place(&mut self, mv: Move, mark: Mark) -> bool {
        self.sub_boards[mv.sub_board].place(mv.cell, mark);
        let result = evaluate(self.sub_boards[mv.sub_board].cells());
        self.results[mv.sub_board] = result;
        result.is_decided()
    }

    /// Overall result; the meta-board is only inspected once enough
    /// sub-boards are decided for a line to exist.
    pub fn meta_result(&self) -> GameResult {
        if self.decided_count() < META_EVALUATION_THRESHOLD {
            return GameResult::InProgress;
        }
        evaluate_meta(&self.results)
    }
}
