//! Pure projection of one trader into the detail panel's display model

use crate::shared::fmt;
use crate::shared::types::{Side, TraderSummary};

/// One open-order row
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub side: Side,
    pub price: String,
    pub quantity: u64,
}

/// One trade-history row
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRow {
    pub time: String,
    pub side: Side,
    pub price: String,
    pub quantity: u64,
}

/// Display model for the trader detail panel
///
/// Built fresh from a summary on every draw; building one never mutates the
/// registry.
#[derive(Debug, Clone, PartialEq)]
pub struct TraderDetail {
    pub id: String,
    pub portfolio_value: String,
    pub cash: String,
    pub shares: i64,
    pub pnl: String,
    pub pnl_positive: bool,
    pub total_volume_traded: u64,
    pub open_orders: Vec<OrderRow>,
    /// Most recent execution first
    pub trade_history: Vec<TradeRow>,
}

impl TraderDetail {
    /// Project a summary into the detail display model
    pub fn project(trader: &TraderSummary) -> TraderDetail {
        let open_orders = trader
            .open_orders
            .iter()
            .map(|order| OrderRow {
                side: order.side,
                price: fmt::currency(order.price),
                quantity: order.quantity,
            })
            .collect();

        // The wire history is oldest-first; the panel reads newest-first
        let trade_history = trader
            .trade_history
            .iter()
            .rev()
            .map(|trade| TradeRow {
                time: trade.timestamp.format("%H:%M:%S").to_string(),
                side: trade.side_for(&trader.id),
                price: fmt::currency(trade.price),
                quantity: trade.quantity,
            })
            .collect();

        TraderDetail {
            id: trader.id.to_string(),
            portfolio_value: fmt::currency(trader.portfolio_value),
            cash: fmt::currency(trader.cash),
            shares: trader.shares,
            pnl: format!(
                "{} ({})",
                fmt::signed_currency(trader.pnl),
                fmt::percent(trader.pnl_percent)
            ),
            pnl_positive: trader.pnl >= 0.0,
            total_volume_traded: trader.total_volume_traded,
            open_orders,
            trade_history,
        }
    }
}
