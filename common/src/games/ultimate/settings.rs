use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;

pub const DEFAULT_DEPTH_LIMIT: usize = 3;
pub const DEFAULT_TOP_CANDIDATES: usize = 3;
pub const DEFAULT_MOVE_DELAY_MS: u64 = 500;

const MAX_DEPTH_LIMIT: usize = 6;
const MAX_TOP_CANDIDATES: usize = 81;
const MAX_MOVE_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotSettings {
    /// Plies searched below each candidate move.
    pub depth_limit: usize,
    /// The bot picks uniformly among this many best-scored moves; `1`
    /// always plays the top move.
    pub top_candidates: usize,
    /// Pause before the bot replies so the human move can be shown first.
    pub move_delay_ms: u64,
}

impl BotSettings {
    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            top_candidates: DEFAULT_TOP_CANDIDATES,
            move_delay_ms: DEFAULT_MOVE_DELAY_MS,
        }
    }
}

impl Validate for BotSettings {
    fn validate(&self) -> Result<(), String> {
        if self.depth_limit == 0 || self.depth_limit > MAX_DEPTH_LIMIT {
            return Err(format!(
                "depth_limit must be between 1 and {}",
                MAX_DEPTH_LIMIT
            ));
        }
        if self.top_candidates == 0 || self.top_candidates > MAX_TOP_CANDIDATES {
            return Err(format!(
                "top_candidates must be between 1 and {}",
                MAX_TOP_CANDIDATES
            ));
        }
        if self.move_delay_ms > MAX_MOVE_DELAY_MS {
            return Err(format!(
                "move_delay_ms must not exceed {}",
                MAX_MOVE_DELAY_MS
            ));
        }
        Ok(())
    }
}
