use crate::value_objects::{AccountId, Money, Timestamp};
use serde::{Deserialize, Serialize};

/// A cash account. `balance` never goes below zero in committed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub account_number: String,
    pub balance: Money,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    /// Whether `amount` can be debited without overdrawing.
    pub fn can_cover(&self, amount: Money) -> bool {
        self.balance >= amount
    }
}
