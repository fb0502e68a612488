use std::fmt;
use std::str::FromStr;

use super::config::ConfigError;

/// Fixed identity of a controller. Decides which half of the tick runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sends, then updates.
    Primary,
    /// Updates, then sends.
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Send,
    Update,
}

impl Role {
    pub fn phases(self) -> [Phase; 2] {
        match self {
            Role::Primary => [Phase::Send, Phase::Update],
            Role::Secondary => [Phase::Update, Phase::Send],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
        }
    }

    /// Single-letter tag used in log lines.
    pub fn alias(&self) -> char {
        match self {
            Role::Primary => 'M',
            Role::Secondary => 'S',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "master" | "m" => Ok(Role::Primary),
            "secondary" | "slave" | "s" => Ok(Role::Secondary),
            _ => Err(ConfigError::InvalidRole(s.to_string())),
        }
    }
}
