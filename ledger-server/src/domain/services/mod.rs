mod order_validator;

pub use order_validator::{MAX_MONEY, OrderValidator, ValidationError};
