use std::fmt;

use serde::{Deserialize, Serialize};

/// Short code a host shares so a guest can join the same match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchCode(String);

impl MatchCode {
    pub fn new(code: String) -> Self {
        Self(code.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MatchCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<MatchCode> for String {
    fn from(code: MatchCode) -> Self {
        code.0
    }
}

impl fmt::Display for MatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
