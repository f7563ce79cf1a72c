use crate::games::SessionRng;
use super::board::Board;
use super::game_state::{GameState, Position};
use super::settings::{BotSettings, DEFAULT_TOP_CANDIDATES};
use super::types::{BOARD_SIZE, GameResult, Mark, Move, SubResult};
use super::win_detector::LINES;

pub const WIN_SCORE: i32 = 1000;

const SUB_BOARD_WON: i32 = 10;
const CELL_TWO_IN_LINE: i32 = 3;
const CELL_ONE_IN_LINE: i32 = 1;
const META_TWO_IN_LINE: i32 = 50;
const META_ONE_IN_LINE: i32 = 5;

pub struct BotInput {
    pub position: Position,
    pub bot_mark: Mark,
    pub settings: BotSettings,
}

impl BotInput {
    pub fn from_game_state(state: &GameState, bot_mark: Mark, settings: BotSettings) -> Self {
        Self {
            position: *state.position(),
            bot_mark,
            settings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

pub fn calculate_move(input: &BotInput, rng: &mut SessionRng) -> Option<Move> {
    let scored = score_moves(&input.position, input.bot_mark, input.settings.depth_limit);
    select_from_top(&scored, input.settings.top_candidates, rng)
}

/// Picks a move for `searching_mark`, normally the side to move, using the
/// default top-3 random selection.
pub fn best_move(
    position: &Position,
    searching_mark: Mark,
    depth_limit: usize,
    rng: &mut SessionRng,
) -> Option<Move> {
    let scored = score_moves(position, searching_mark, depth_limit);
    select_from_top(&scored, DEFAULT_TOP_CANDIDATES, rng)
}

/// Scores every legal move from the maximizer's point of view, best first.
/// Equal scores keep board order.
pub fn score_moves(position: &Position, searching_mark: Mark, depth_limit: usize) -> Vec<ScoredMove> {
    let mut scored: Vec<ScoredMove> = position
        .legal_moves()
        .into_iter()
        .filter_map(|mv| {
            let child = position.play(mv).ok()?;
            let score = minimax(&child, searching_mark, depth_limit, i32::MIN, i32::MAX);
            Some(ScoredMove { mv, score })
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

pub fn select_from_top(scored: &[ScoredMove], top_candidates: usize, rng: &mut SessionRng) -> Option<Move> {
    if scored.is_empty() {
        return None;
    }
    let count = top_candidates.clamp(1, scored.len());
    let index = rng.random_range(0..count);
    Some(scored[index].mv)
}

fn terminal_score(result: GameResult, bot_mark: Mark) -> Option<i32> {
    match result {
        GameResult::InProgress => None,
        GameResult::Drawn => Some(0),
        GameResult::Won(winner) if winner == bot_mark => Some(WIN_SCORE),
        GameResult::Won(_) => Some(-WIN_SCORE),
    }
}

fn minimax(position: &Position, bot_mark: Mark, depth: usize, mut alpha: i32, mut beta: i32) -> i32 {
    if let Some(score) = terminal_score(position.result(), bot_mark) {
        return score;
    }

    if depth == 0 {
        return evaluate_position(position.board(), bot_mark);
    }

    let moves = position.legal_moves();
    if moves.is_empty() {
        return evaluate_position(position.board(), bot_mark);
    }

    if position.current_player() == bot_mark {
        let mut max_eval = i32::MIN;
        for mv in moves {
            let Ok(child) = position.play(mv) else {
                continue;
            };
            let eval = minimax(&child, bot_mark, depth - 1, alpha, beta);

            max_eval = max_eval.max(eval);
            alpha = alpha.max(eval);
            if beta <= alpha {
                break;
            }
        }
        if max_eval == i32::MIN { 0 } else { max_eval }
    } else {
        let mut min_eval = i32::MAX;
        for mv in moves {
            let Ok(child) = position.play(mv) else {
                continue;
            };
            let eval = minimax(&child, bot_mark, depth - 1, alpha, beta);

            min_eval = min_eval.min(eval);
            beta = beta.min(eval);
            if beta <= alpha {
                break;
            }
        }
        if min_eval == i32::MAX { 0 } else { min_eval }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Open,
    Owned(Mark),
}

fn score_lines(slots: &[Slot; BOARD_SIZE], bot_mark: Mark, two: i32, one: i32) -> i32 {
    LINES
        .iter()
        .map(|line| {
            let mut own = 0;
            let mut other = 0;
            for &index in line {
                match slots[index] {
                    Slot::Open => {}
                    Slot::Owned(mark) if mark == bot_mark => own += 1,
                    Slot::Owned(_) => other += 1,
                }
            }
            match (own, other) {
                (2, 0) => two,
                (1, 0) => one,
                (0, 2) => -two,
                (0, 1) => -one,
                _ => 0,
            }
        })
        .sum()
}

/// Static score of a non-terminal position from `bot_mark`'s side: won
/// sub-boards, open lines inside undecided sub-boards, and open lines on the
/// meta-board. A drawn sub-board belongs to neither side, so it counts as an
/// open slot on the meta lines through it.
pub fn evaluate_position(board: &Board, bot_mark: Mark) -> i32 {
    let mut score = 0;

    for (index, result) in board.results().iter().enumerate() {
        score += match result {
            SubResult::Won(mark) if *mark == bot_mark => SUB_BOARD_WON,
            SubResult::Won(_) => -SUB_BOARD_WON,
            SubResult::Drawn => 0,
            SubResult::Undetermined => {
                let slots = board
                    .sub_board(index)
                    .cells()
                    .map(|cell| cell.map_or(Slot::Open, Slot::Owned));
                score_lines(&slots, bot_mark, CELL_TWO_IN_LINE, CELL_ONE_IN_LINE)
            }
        };
    }

    let meta_slots = board.results().map(|result| match result.winner() {
        Some(mark) => Slot::Owned(mark),
        None => Slot::Open,
    });
    score + score_lines(&meta_slots, bot_mark, META_TWO_IN_LINE, META_ONE_IN_LINE)
}
