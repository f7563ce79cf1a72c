use std::fmt::Write;

use common::games::GameBroadcaster;
use common::games::ultimate::{
    BOARD_SIZE, Board, GameMode, GameResult, MatchSnapshot, MoveError, SubResult,
};

#[derive(Clone, Default)]
pub struct TerminalBroadcaster;

impl TerminalBroadcaster {
    pub fn new() -> Self {
        Self
    }
}

impl GameBroadcaster for TerminalBroadcaster {
    async fn broadcast_state(&self, snapshot: MatchSnapshot) {
        println!("{}", render_snapshot(&snapshot));
    }

    async fn broadcast_rejection(&self, error: MoveError) {
        println!("move rejected: {}", error);
    }
}

pub fn render_snapshot(snapshot: &MatchSnapshot) -> String {
    let state = &snapshot.state;
    let mut out = render_board(state.board(), state.active_sub_board());

    let _ = writeln!(out, "{}", render_results(state.board()));
    let _ = match state.result() {
        GameResult::Won(mark) => writeln!(out, "{} wins. Type `reset` to play again.", mark),
        GameResult::Drawn => writeln!(out, "Draw. Type `reset` to play again."),
        GameResult::InProgress => {
            let target = match state.active_sub_board() {
                Some(index) => format!("sub-board {}", index),
                None => "any open sub-board".to_string(),
            };
            let whose = match snapshot.mode {
                GameMode::Ai { ai_mark } if ai_mark == state.current_player() => " (bot thinking)",
                _ if snapshot.is_local_turn => "",
                _ => " (waiting)",
            };
            writeln!(out, "{} to move in {}{}", state.current_player(), target, whose)
        }
    };
    out
}

/// Draws the 9x9 grid. Cells of the active sub-board are bracketed.
pub fn render_board(board: &Board, active: Option<usize>) -> String {
    let mut out = String::new();

    for big_row in 0..3 {
        if big_row > 0 {
            out.push_str("---------+---------+---------\n");
        }
        for small_row in 0..3 {
            let mut columns = Vec::with_capacity(3);
            for big_col in 0..3 {
                let sub_board = big_row * 3 + big_col;
                let (open, close) = if active == Some(sub_board) { ('[', ']') } else { (' ', ' ') };
                let mut column = String::new();
                for small_col in 0..3 {
                    let cell = small_row * 3 + small_col;
                    let symbol = board.sub_board(sub_board).cell(cell).map_or('.', |mark| mark.symbol());
                    column.push(open);
                    column.push(symbol);
                    column.push(close);
                }
                columns.push(column);
            }
            out.push_str(&columns.join("|"));
            out.push('\n');
        }
    }
    out
}

fn render_results(board: &Board) -> String {
    let results: String = (0..BOARD_SIZE)
        .map(|index| match board.result(index) {
            SubResult::Undetermined => '.',
            SubResult::Won(mark) => mark.symbol(),
            SubResult::Drawn => '=',
        })
        .collect();
    format!("sub-boards: {}", results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::games::ultimate::{ConnectionState, GameState, Move};

    fn snapshot(state: GameState, mode: GameMode) -> MatchSnapshot {
        MatchSnapshot {
            state,
            mode,
            connection: ConnectionState::Active,
            role: None,
            match_code: None,
            is_local_turn: true,
        }
    }

    #[test]
    fn test_board_marks_active_sub_board() {
        let state = GameState::replay(&[Move::new(4, 4)]).unwrap();
        let rendered = render_board(state.board(), state.active_sub_board());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 11);
        assert_eq!(lines[4], " .  .  . |[.][.][.]| .  .  . ");
        assert_eq!(lines[5], " .  .  . |[.][X][.]| .  .  . ");
        assert_eq!(lines[0], " .  .  . | .  .  . | .  .  . ");
    }

    #[test]
    fn test_snapshot_reports_turn_and_target() {
        let state = GameState::replay(&[Move::new(4, 4)]).unwrap();
        let rendered = render_snapshot(&snapshot(state, GameMode::Local));
        assert!(rendered.contains("sub-boards: ........."));
        assert!(rendered.ends_with("O to move in sub-board 4\n"));
    }

    #[test]
    fn test_snapshot_shows_bot_turn() {
        let state = GameState::replay(&[Move::new(4, 4)]).unwrap();
        let rendered = render_snapshot(&snapshot(
            state,
            GameMode::Ai {
                ai_mark: common::games::ultimate::Mark::Second,
            },
        ));
        assert!(rendered.contains("(bot thinking)"));
    }
}
