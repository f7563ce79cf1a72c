use super::types::{BOARD_SIZE, Cell, GameResult, Mark, SubResult};

/// Rows, then columns, then the two diagonals. The scan order is fixed so
/// repeated searches over the same position stay reproducible.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Sub-results must be decided on this many sub-boards before a meta line
/// can possibly be complete.
pub const META_EVALUATION_THRESHOLD: usize = 5;

fn line_winner(marks: &[Option<Mark>; BOARD_SIZE]) -> Option<Mark> {
    for [a, b, c] in LINES {
        if let Some(mark) = marks[a]
            && marks[b] == Some(mark)
            && marks[c] == Some(mark)
        {
            return Some(mark);
        }
    }
    None
}

pub fn evaluate(cells: &[Cell; BOARD_SIZE]) -> SubResult {
    if let Some(mark) = line_winner(cells) {
        return SubResult::Won(mark);
    }

    if cells.iter().all(Option::is_some) {
        SubResult::Drawn
    } else {
        SubResult::Undetermined
    }
}

/// Evaluates the meta-board formed by the nine sub-results. Only `Won`
/// sub-boards count towards a line; a drawn sub-board fills its square
/// without belonging to either side.
pub fn evaluate_meta(results: &[SubResult; BOARD_SIZE]) -> GameResult {
    let owners = results.map(|result| result.winner());
    if let Some(mark) = line_winner(&owners) {
        return GameResult::Won(mark);
    }

    if results.iter().all(SubResult::is_decided) {
        GameResult::Drawn
    } else {
        GameResult::InProgress
    }
}
