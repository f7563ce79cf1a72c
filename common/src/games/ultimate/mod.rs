mod board;
mod bot_controller;
mod game_state;
mod match_controller;
mod session;
mod settings;
mod transport;
mod types;
mod win_detector;

pub use board::{Board, SubBoard};
pub use bot_controller::{
    BotInput, ScoredMove, WIN_SCORE, best_move, calculate_move, evaluate_position, score_moves,
};
pub use game_state::{GameState, MoveError, Position, apply_move};
pub use match_controller::{
    ConnectionState, GameMode, MatchController, MatchError, MatchSnapshot, MoveOutcome, Role,
    TurnAuthority,
};
pub use session::{MatchSession, SessionCommand};
pub use settings::BotSettings;
pub use transport::{ChannelEndpoint, ChannelTransport, MoveTransport, TransportError, TransportEvent};
pub use types::{BOARD_SIZE, Cell, GameResult, Mark, Move, MoveRecord, SubResult};
pub use win_detector::{LINES, evaluate, evaluate_meta};
