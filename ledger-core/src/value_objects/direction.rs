use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way an order moves value: BUY spends cash, SELL gives up shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Direction {
    type Error = &'static str;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "BUY" => Ok(Direction::Buy),
            "SELL" => Ok(Direction::Sell),
            _ => Err("Invalid direction: must be BUY or SELL"),
        }
    }
}

impl FromStr for Direction {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Direction::try_from("buy"), Ok(Direction::Buy));
        assert_eq!(Direction::try_from("SELL"), Ok(Direction::Sell));
        assert!(Direction::try_from("HOLD").is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for direction in [Direction::Buy, Direction::Sell] {
            assert_eq!(direction.to_string().parse::<Direction>(), Ok(direction));
        }
    }
}
