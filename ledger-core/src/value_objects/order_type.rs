use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order type as submitted by the client.
///
/// The ledger does not interpret it: both kinds reserve `price * quantity`
/// at placement and are stored as-is for whatever executes them later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OrderType {
    type Error = &'static str;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            _ => Err("Invalid order type: must be MARKET or LIMIT"),
        }
    }
}

impl FromStr for OrderType {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderType::try_from(s)
    }
}
