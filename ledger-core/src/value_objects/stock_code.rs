use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_STOCK_CODE_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockCodeError {
    #[error("stock code cannot be empty")]
    Empty,

    #[error("stock code too long (max 20 chars)")]
    TooLong,

    #[error("stock code must be alphanumeric, '_' or '-'")]
    InvalidCharacter,
}

/// Ticker symbol of a listed stock, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockCode(String);

impl StockCode {
    pub fn new(value: impl Into<String>) -> Result<Self, StockCodeError> {
        let s: String = value.into();
        let s = s.trim();
        if s.is_empty() {
            return Err(StockCodeError::Empty);
        }
        if s.len() > MAX_STOCK_CODE_LEN {
            return Err(StockCodeError::TooLong);
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StockCodeError::InvalidCharacter);
        }
        Ok(StockCode(s.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StockCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for StockCode {
    type Error = StockCodeError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        StockCode::new(value)
    }
}

impl TryFrom<String> for StockCode {
    type Error = StockCodeError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        StockCode::new(value)
    }
}

impl From<StockCode> for String {
    fn from(code: StockCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_to_uppercase() {
        let code = StockCode::new(" stock01 ").unwrap();
        assert_eq!(code.as_str(), "STOCK01");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(StockCode::new(""), Err(StockCodeError::Empty));
        assert_eq!(StockCode::new("A".repeat(21)), Err(StockCodeError::TooLong));
        assert_eq!(
            StockCode::new("BRK.B"),
            Err(StockCodeError::InvalidCharacter)
        );
        assert!(StockCode::new("BRK-B").is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let code: StockCode = serde_json::from_str("\"aapl\"").unwrap();
        assert_eq!(code.as_str(), "AAPL");
        assert!(serde_json::from_str::<StockCode>("\"\"").is_err());
    }
}
