mod account;
mod holding;
mod order;

pub use account::Account;
pub use holding::Holding;
pub use order::{NewOrder, Order, OrderStatus};
