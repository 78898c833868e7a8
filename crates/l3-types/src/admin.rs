//! Administrative state.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative state of a router or of one protocol on a router interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    Down,
    /// New routers and interfaces come up enabled.
    #[default]
    Up,
}

impl AdminState {
    pub const fn is_up(&self) -> bool {
        matches!(self, AdminState::Up)
    }

    pub const fn is_down(&self) -> bool {
        matches!(self, AdminState::Down)
    }
}

impl From<bool> for AdminState {
    fn from(up: bool) -> Self {
        if up {
            AdminState::Up
        } else {
            AdminState::Down
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminState::Up => write!(f, "up"),
            AdminState::Down => write!(f, "down"),
        }
    }
}

impl FromStr for AdminState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "enable" | "enabled" => Ok(AdminState::Up),
            "down" | "disable" | "disabled" => Ok(AdminState::Down),
            _ => Err(ParseError::InvalidAdminState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_up() {
        assert!(AdminState::default().is_up());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("UP".parse::<AdminState>().unwrap(), AdminState::Up);
        assert_eq!("disabled".parse::<AdminState>().unwrap(), AdminState::Down);
        assert!("sideways".parse::<AdminState>().is_err());
        assert_eq!(AdminState::Down.to_string(), "down");
        assert_eq!(AdminState::from(false), AdminState::Down);
    }
}
