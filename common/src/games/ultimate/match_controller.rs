use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::SessionRng;
use crate::id_generator::generate_match_code;
use crate::identifiers::MatchCode;
use super::bot_controller::{BotInput, calculate_move};
use super::game_state::{GameState, MoveError};
use super::settings::BotSettings;
use super::types::{Mark, Move, MoveRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Local,
    Ai { ai_mark: Mark },
    Networked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    /// The host always plays `First` and opens the match.
    pub fn assigned_mark(&self) -> Mark {
        match self {
            Role::Host => Mark::First,
            Role::Guest => Mark::Second,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    WaitingForPeer,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnAuthority {
    pub role: Role,
    pub assigned_mark: Mark,
    pub awaiting_opponent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("only networked matches have roles and connections")]
    NotNetworked,

    #[error("{role:?} always plays {expected}, not {requested}")]
    RoleMarkMismatch {
        role: Role,
        expected: Mark,
        requested: Mark,
    },

    #[error("role is fixed as {current:?} for this match")]
    RoleLocked { current: Role },
}

/// What the UI gets to render after every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub state: GameState,
    pub mode: GameMode,
    pub connection: ConnectionState,
    pub role: Option<Role>,
    pub match_code: Option<MatchCode>,
    pub is_local_turn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub record: MoveRecord,
    /// Set when the move must be forwarded to the peer.
    pub outgoing: Option<Move>,
}

/// Owns the single live `GameState` of a match and decides who may move.
pub struct MatchController {
    mode: GameMode,
    state: GameState,
    authority: Option<TurnAuthority>,
    connection: ConnectionState,
    match_code: Option<MatchCode>,
    bot_settings: BotSettings,
    rng: SessionRng,
}

impl MatchController {
    pub fn new(mode: GameMode, bot_settings: BotSettings, rng: SessionRng) -> Self {
        Self {
            mode,
            state: GameState::new(),
            authority: None,
            connection: initial_connection(mode),
            match_code: None,
            bot_settings,
            rng,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn authority(&self) -> Option<&TurnAuthority> {
        self.authority.as_ref()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn match_code(&self) -> Option<&MatchCode> {
        self.match_code.as_ref()
    }

    pub fn bot_settings(&self) -> &BotSettings {
        &self.bot_settings
    }

    /// Starts a fresh match in the given mode; any networked role is
    /// dropped along with the old state.
    pub fn select_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.state = GameState::new();
        self.authority = None;
        self.connection = initial_connection(mode);
        self.match_code = None;
    }

    /// Opens a networked match as host and returns the code to share.
    pub fn host_match(&mut self) -> MatchCode {
        self.select_mode(GameMode::Networked);
        let code = generate_match_code(&mut self.rng);
        self.set_authority(Role::Host);
        self.connection = ConnectionState::Connecting;
        self.match_code = Some(code.clone());
        code
    }

    pub fn join_match(&mut self, code: MatchCode) {
        self.select_mode(GameMode::Networked);
        self.set_authority(Role::Guest);
        self.connection = ConnectionState::Connecting;
        self.match_code = Some(code);
    }

    /// Replaces the game with a fresh one. The mode and any networked role
    /// stay as they are.
    pub fn request_reset(&mut self) {
        self.state = GameState::new();
        if let Some(authority) = self.authority.as_mut() {
            authority.awaiting_opponent = authority.assigned_mark != self.state.current_player();
        }
    }

    pub fn is_local_turn(&self) -> bool {
        if self.state.result().is_over() {
            return false;
        }
        match self.mode {
            GameMode::Local => true,
            GameMode::Ai { ai_mark } => self.state.current_player() != ai_mark,
            GameMode::Networked => {
                self.connection == ConnectionState::Active
                    && self.authority.is_some_and(|a| {
                        !a.awaiting_opponent && a.assigned_mark == self.state.current_player()
                    })
            }
        }
    }

    pub fn request_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        if self.state.result().is_over() {
            return Err(MoveError::GameOver);
        }

        match self.mode {
            GameMode::Local => {
                let record = self.apply(mv)?;
                Ok(MoveOutcome { record, outgoing: None })
            }
            GameMode::Ai { ai_mark } => {
                if self.state.current_player() == ai_mark {
                    return Err(MoveError::NotYourTurn);
                }
                let record = self.apply(mv)?;
                Ok(MoveOutcome { record, outgoing: None })
            }
            GameMode::Networked => {
                let Some(authority) = self.authority else {
                    return Err(MoveError::NotConnected);
                };
                if self.connection != ConnectionState::Active {
                    return Err(MoveError::NotConnected);
                }
                if self.state.current_player() != authority.assigned_mark {
                    return Err(MoveError::NotYourTurn);
                }

                let record = self.apply(mv)?;
                self.set_awaiting_opponent(true);
                Ok(MoveOutcome {
                    record,
                    outgoing: Some(mv),
                })
            }
        }
    }

    /// Applies a move delivered by the transport. The remote side already
    /// enforced turn ownership, so only the rules are checked here.
    pub fn on_peer_move(&mut self, mv: Move) -> Result<MoveRecord, MoveError> {
        if self.mode != GameMode::Networked || self.authority.is_none() {
            return Err(MoveError::NotConnected);
        }
        if self.state.result().is_over() {
            return Err(MoveError::GameOver);
        }

        let record = self.apply(mv)?;
        self.set_awaiting_opponent(false);
        Ok(record)
    }

    pub fn on_role_assigned(&mut self, role: Role, mark: Mark) -> Result<(), MatchError> {
        if self.mode != GameMode::Networked {
            return Err(MatchError::NotNetworked);
        }

        let expected = role.assigned_mark();
        if mark != expected {
            return Err(MatchError::RoleMarkMismatch {
                role,
                expected,
                requested: mark,
            });
        }

        match self.authority {
            Some(current) if current.role == role => Ok(()),
            Some(current) => Err(MatchError::RoleLocked {
                current: current.role,
            }),
            None => {
                self.set_authority(role);
                Ok(())
            }
        }
    }

    pub fn on_connection_state_changed(&mut self, connection: ConnectionState) -> Result<(), MatchError> {
        if self.mode != GameMode::Networked {
            return Err(MatchError::NotNetworked);
        }
        self.connection = connection;
        Ok(())
    }

    /// The mark the bot should play right now, if any.
    pub fn pending_ai_mark(&self) -> Option<Mark> {
        match self.mode {
            GameMode::Ai { ai_mark }
                if !self.state.result().is_over() && self.state.current_player() == ai_mark =>
            {
                Some(ai_mark)
            }
            _ => None,
        }
    }

    /// Everything a search needs, detached from the controller so it can
    /// run on another thread.
    pub fn bot_request(&mut self) -> Option<(BotInput, SessionRng)> {
        let ai_mark = self.pending_ai_mark()?;
        let input = BotInput::from_game_state(&self.state, ai_mark, self.bot_settings);
        Some((input, self.rng.fork()))
    }

    /// Applies a move chosen by the bot. Rejected if the bot is no longer
    /// the side to move, e.g. after a reset.
    pub fn apply_ai_move(&mut self, mv: Move) -> Result<MoveRecord, MoveError> {
        if self.state.result().is_over() {
            return Err(MoveError::GameOver);
        }
        if self.pending_ai_mark().is_none() {
            return Err(MoveError::NotYourTurn);
        }
        self.apply(mv)
    }

    /// Runs the bot inline and applies its move.
    pub fn play_ai_move(&mut self) -> Option<MoveRecord> {
        let (input, mut rng) = self.bot_request()?;
        let mv = calculate_move(&input, &mut rng)?;
        self.apply_ai_move(mv).ok()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            state: self.state.clone(),
            mode: self.mode,
            connection: self.connection,
            role: self.authority.map(|a| a.role),
            match_code: self.match_code.clone(),
            is_local_turn: self.is_local_turn(),
        }
    }

    fn apply(&mut self, mv: Move) -> Result<MoveRecord, MoveError> {
        let mark = self.state.current_player();
        self.state = self.state.apply_move(mv)?;
        Ok(MoveRecord {
            sub_board: mv.sub_board,
            cell: mv.cell,
            mark,
        })
    }

    fn set_authority(&mut self, role: Role) {
        let assigned_mark = role.assigned_mark();
        self.authority = Some(TurnAuthority {
            role,
            assigned_mark,
            awaiting_opponent: self.state.current_player() != assigned_mark,
        });
    }

    fn set_awaiting_opponent(&mut self, awaiting: bool) {
        if let Some(authority) = self.authority.as_mut() {
            authority.awaiting_opponent = awaiting;
        }
    }
}

fn initial_connection(mode: GameMode) -> ConnectionState {
    match mode {
        GameMode::Networked => ConnectionState::Disconnected,
        GameMode::Local | GameMode::Ai { .. } => ConnectionState::Active,
    }
}
