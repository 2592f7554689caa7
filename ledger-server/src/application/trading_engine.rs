//! Order lifecycle orchestration.
//!
//! Every mutating operation runs inside exactly one store transaction: the
//! balance or holding is checked and adjusted, the order row is written, and
//! the transaction commits. Any failure rolls the whole transaction back, so
//! callers never observe a debit without its order or a status change without
//! its refund.

use crate::application::ports::{
    AccountLedger, HoldingLedger, LedgerError, LedgerResult, LedgerStore, OrderLedger, StoreError,
    UnitOfWork,
};
use crate::domain::{
    AccountId, Direction, Money, NewOrder, Order, OrderId, OrderStatus, OrderType,
    OrderValidator, Quantity, StockCode, ValidationError, order_value,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A validated request to place an order.
///
/// Can only be built through [`CreateOrderCommand::new`], so the engine never
/// sees a non-positive quantity or an unrepresentable price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderCommand {
    account_id: AccountId,
    stock_code: StockCode,
    order_type: OrderType,
    direction: Direction,
    quantity: Quantity,
    price: Money,
}

impl CreateOrderCommand {
    pub fn new(
        account_id: AccountId,
        stock_code: StockCode,
        order_type: OrderType,
        direction: Direction,
        quantity: Quantity,
        price: Money,
    ) -> Result<Self, ValidationError> {
        OrderValidator::validate_create(quantity, price)?;
        Ok(Self {
            account_id,
            stock_code,
            order_type,
            direction,
            quantity,
            price,
        })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn stock_code(&self) -> &StockCode {
        &self.stock_code
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn price(&self) -> Money {
        self.price
    }

    fn into_new_order(self) -> NewOrder {
        NewOrder::pending(
            self.account_id,
            self.stock_code,
            self.order_type,
            self.direction,
            self.quantity,
            self.price,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    pub account_number: String,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingView {
    pub stock_code: StockCode,
    pub quantity: Quantity,
}

/// The operations exposed to the HTTP layer.
#[async_trait]
pub trait TradingService: Send + Sync + 'static {
    async fn get_account_balance(&self, account_id: AccountId) -> LedgerResult<BalanceView>;

    async fn get_account_holdings(&self, account_id: AccountId) -> LedgerResult<Vec<HoldingView>>;

    async fn create_order(&self, command: CreateOrderCommand) -> LedgerResult<Order>;

    async fn cancel_order(&self, order_id: OrderId) -> LedgerResult<Order>;
}

pub struct TradingEngine<S, A, H, O> {
    store: Arc<S>,
    accounts: Arc<A>,
    holdings: Arc<H>,
    orders: Arc<O>,
}

impl<S, A, H, O> Clone for TradingEngine<S, A, H, O> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            accounts: Arc::clone(&self.accounts),
            holdings: Arc::clone(&self.holdings),
            orders: Arc::clone(&self.orders),
        }
    }
}

impl<S, A, H, O> TradingEngine<S, A, H, O>
where
    S: LedgerStore,
    A: AccountLedger<S::Tx>,
    H: HoldingLedger<S::Tx>,
    O: OrderLedger<S::Tx>,
{
    pub fn new(store: Arc<S>, accounts: Arc<A>, holdings: Arc<H>, orders: Arc<O>) -> Self {
        Self {
            store,
            accounts,
            holdings,
            orders,
        }
    }

    /// Commit on success, roll back on failure. The operation error wins over
    /// any rollback error.
    async fn finish<T>(&self, tx: S::Tx, outcome: LedgerResult<T>) -> LedgerResult<T> {
        match outcome {
            Ok(value) => {
                tx.commit().await.inspect_err(|e| {
                    if e.is_retryable() {
                        warn!(error = %e, "commit lost a write conflict");
                    }
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed");
                }
                debug!(error = %err, "transaction rolled back");
                if err.is_retryable() {
                    warn!(error = %err, "operation aborted by a write conflict");
                }
                Err(err)
            }
        }
    }

    /// End a query. Nothing was written, so the transaction is discarded
    /// instead of validated and a concurrent writer can never fail a read.
    async fn finish_read<T>(&self, tx: S::Tx, outcome: LedgerResult<T>) -> LedgerResult<T> {
        if let Err(e) = tx.rollback().await {
            warn!(error = %e, "rollback of read-only transaction failed");
        }
        outcome
    }

    /// Steps 2-5 of order placement: check and reserve, then insert.
    async fn reserve_and_insert(
        &self,
        tx: &mut S::Tx,
        command: CreateOrderCommand,
    ) -> LedgerResult<Order> {
        let account = self.accounts.get_by_id(tx, command.account_id()).await?;

        match command.direction() {
            Direction::Buy => {
                let cost = order_value(command.price(), command.quantity()).ok_or_else(|| {
                    StoreError::Constraint("order value overflows".to_string())
                })?;

                if !account.can_cover(cost) {
                    warn!(
                        account_id = account.id,
                        required = %cost,
                        available = %account.balance,
                        "insufficient funds"
                    );
                    return Err(LedgerError::InsufficientFunds {
                        required: cost,
                        available: account.balance,
                    });
                }

                self.accounts
                    .update_balance(tx, account.id, account.balance - cost)
                    .await?;
            }
            Direction::Sell => {
                let available = self
                    .holdings
                    .get_by_account_and_symbol(tx, account.id, command.stock_code())
                    .await?
                    .map_or(0, |h| h.quantity);

                if available < command.quantity() {
                    warn!(
                        account_id = account.id,
                        stock_code = %command.stock_code(),
                        requested = command.quantity(),
                        available,
                        "insufficient holding quantity"
                    );
                    return Err(LedgerError::InsufficientHoldingQuantity {
                        stock_code: command.stock_code().clone(),
                        requested: command.quantity(),
                        available,
                    });
                }

                self.holdings
                    .set_quantity(
                        tx,
                        account.id,
                        command.stock_code(),
                        available - command.quantity(),
                    )
                    .await?;
            }
        }

        self.orders.create(tx, command.into_new_order()).await
    }

    /// Steps 2-6 of cancellation: return the unfilled reservation and mark
    /// the order canceled.
    async fn release_and_cancel(&self, tx: &mut S::Tx, order_id: OrderId) -> LedgerResult<Order> {
        let order = self.orders.get_by_id(tx, order_id).await?;

        if !order.is_cancelable() {
            warn!(order_id, status = %order.status, "order is not cancelable");
            return Err(LedgerError::OrderNotCancelable {
                order_id,
                status: order.status,
            });
        }

        let unfilled = order.unfilled_quantity();

        match order.direction {
            Direction::Buy => {
                let refund = order.unfilled_value().ok_or_else(|| {
                    StoreError::Constraint(format!("order {} value overflows", order.id))
                })?;
                let account = self.accounts.get_by_id(tx, order.account_id).await?;
                self.accounts
                    .update_balance(tx, account.id, account.balance + refund)
                    .await?;
            }
            Direction::Sell if unfilled > 0 => {
                match self
                    .holdings
                    .get_by_account_and_symbol(tx, order.account_id, &order.stock_code)
                    .await?
                {
                    Some(holding) => {
                        let restored = holding.quantity.checked_add(unfilled).ok_or_else(|| {
                            StoreError::Constraint(format!(
                                "holding {} quantity overflows restoring {}",
                                holding.id, unfilled
                            ))
                        })?;
                        self.holdings
                            .set_quantity(tx, order.account_id, &order.stock_code, restored)
                            .await?
                    }
                    None => {
                        self.holdings
                            .create(tx, order.account_id, &order.stock_code, unfilled)
                            .await?
                    }
                }
            }
            Direction::Sell => {}
        }

        self.orders
            .update_status(tx, order_id, OrderStatus::Canceled)
            .await?;

        self.orders.get_by_id(tx, order_id).await
    }
}

#[async_trait]
impl<S, A, H, O> TradingService for TradingEngine<S, A, H, O>
where
    S: LedgerStore + 'static,
    A: AccountLedger<S::Tx> + 'static,
    H: HoldingLedger<S::Tx> + 'static,
    O: OrderLedger<S::Tx> + 'static,
{
    async fn get_account_balance(&self, account_id: AccountId) -> LedgerResult<BalanceView> {
        let mut tx = self.store.begin().await?;
        let outcome = self
            .accounts
            .get_by_id(&mut tx, account_id)
            .await
            .map(|account| BalanceView {
                account_number: account.account_number,
                balance: account.balance,
            });
        self.finish_read(tx, outcome).await
    }

    async fn get_account_holdings(&self, account_id: AccountId) -> LedgerResult<Vec<HoldingView>> {
        let mut tx = self.store.begin().await?;
        let outcome = match self.accounts.get_by_id(&mut tx, account_id).await {
            Ok(_) => self
                .holdings
                .list_by_account(&mut tx, account_id)
                .await
                .map(|holdings| {
                    holdings
                        .into_iter()
                        .map(|h| HoldingView {
                            stock_code: h.stock_code,
                            quantity: h.quantity,
                        })
                        .collect()
                }),
            Err(e) => Err(e),
        };
        self.finish_read(tx, outcome).await
    }

    async fn create_order(&self, command: CreateOrderCommand) -> LedgerResult<Order> {
        let mut tx = self.store.begin().await?;
        let outcome = self.reserve_and_insert(&mut tx, command).await;
        let order = self.finish(tx, outcome).await?;

        info!(
            order_id = order.id,
            account_id = order.account_id,
            stock_code = %order.stock_code,
            direction = %order.direction,
            quantity = order.quantity,
            price = %order.price,
            "order created"
        );
        Ok(order)
    }

    async fn cancel_order(&self, order_id: OrderId) -> LedgerResult<Order> {
        let mut tx = self.store.begin().await?;
        let outcome = self.release_and_cancel(&mut tx, order_id).await;
        let order = self.finish(tx, outcome).await?;

        info!(
            order_id = order.id,
            account_id = order.account_id,
            direction = %order.direction,
            released = order.unfilled_quantity(),
            "order canceled"
        );
        Ok(order)
    }
}
