use common::games::ultimate::{GameMode, Mark, Move, SessionCommand};

pub const HELP: &str = "\
commands:
  <sub-board> <cell>   place a mark, both 0-8 (e.g. `4 4`)
  reset                start a new game
  mode local           hotseat, both marks at this terminal
  mode ai [x|o]        play against the bot, which takes the given mark
  help                 show this text
  quit                 leave";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(SessionCommand),
    Help,
}

pub fn parse_input(line: &str, default_ai_mark: Mark) -> Result<Input, String> {
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        ["quit"] | ["exit"] => Ok(Input::Command(SessionCommand::Shutdown)),
        ["reset"] => Ok(Input::Command(SessionCommand::RequestReset)),
        ["help"] | ["?"] => Ok(Input::Help),
        ["mode", "local"] => Ok(Input::Command(SessionCommand::SelectMode(GameMode::Local))),
        ["mode", "ai"] => Ok(Input::Command(SessionCommand::SelectMode(GameMode::Ai {
            ai_mark: default_ai_mark,
        }))),
        ["mode", "ai", mark] => {
            let ai_mark = parse_mark(mark)?;
            Ok(Input::Command(SessionCommand::SelectMode(GameMode::Ai { ai_mark })))
        }
        [sub_board, cell] => {
            let sub_board = parse_index(sub_board)?;
            let cell = parse_index(cell)?;
            Ok(Input::Command(SessionCommand::RequestMove(Move::new(sub_board, cell))))
        }
        [] => Err("empty input".to_string()),
        _ => Err(format!("unknown command: {}", line.trim())),
    }
}

fn parse_index(word: &str) -> Result<usize, String> {
    word.parse::<usize>()
        .map_err(|_| format!("not a number: {}", word))
}

fn parse_mark(word: &str) -> Result<Mark, String> {
    match word.to_ascii_lowercase().as_str() {
        "x" | "first" => Ok(Mark::First),
        "o" | "second" => Ok(Mark::Second),
        _ => Err(format!("unknown mark: {}", word)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(
            parse_input(" 4  0 ", Mark::Second),
            Ok(Input::Command(SessionCommand::RequestMove(Move::new(4, 0))))
        );
    }

    #[test]
    fn test_out_of_range_index_is_left_to_the_engine() {
        assert_eq!(
            parse_input("9 0", Mark::Second),
            Ok(Input::Command(SessionCommand::RequestMove(Move::new(9, 0))))
        );
    }

    #[test]
    fn test_parse_mode_with_mark() {
        assert_eq!(
            parse_input("mode ai X", Mark::Second),
            Ok(Input::Command(SessionCommand::SelectMode(GameMode::Ai {
                ai_mark: Mark::First,
            })))
        );
        assert_eq!(
            parse_input("mode ai", Mark::Second),
            Ok(Input::Command(SessionCommand::SelectMode(GameMode::Ai {
                ai_mark: Mark::Second,
            })))
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_input("a b", Mark::Second).is_err());
        assert!(parse_input("", Mark::Second).is_err());
        assert!(parse_input("mode ai z", Mark::Second).is_err());
        assert!(parse_input("1 2 3", Mark::Second).is_err());
    }

    #[test]
    fn test_quit_and_reset() {
        assert_eq!(
            parse_input("quit", Mark::Second),
            Ok(Input::Command(SessionCommand::Shutdown))
        );
        assert_eq!(
            parse_input("reset", Mark::Second),
            Ok(Input::Command(SessionCommand::RequestReset))
        );
    }
}
