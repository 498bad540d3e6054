//! Market-view state: latest snapshot, bounded trade feed, book depth

use std::collections::VecDeque;

use crate::shared::types::{BookLevel, MarketSnapshot, OrderBookSnapshot, Trade};

/// Maximum rows rendered per book side
pub const BOOK_DEPTH: usize = 10;

/// Maximum entries kept in the live trade feed
pub const TRADE_FEED_CAPACITY: usize = 20;

/// Bounded newest-first log of executions
///
/// Additive across pushes, unlike the snapshot fields around it.
#[derive(Debug, Default)]
pub struct TradeFeed {
    entries: VecDeque<Trade>,
}

impl TradeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pushed batch, in batch order, to the front
    ///
    /// The batch's last entry ends up newest. Trims from the back until the
    /// feed holds at most [`TRADE_FEED_CAPACITY`] entries.
    pub fn apply(&mut self, batch: Vec<Trade>) {
        for trade in batch {
            self.entries.push_front(trade);
        }
        while self.entries.len() > TRADE_FEED_CAPACITY {
            self.entries.pop_back();
        }
    }

    /// Entries newest-first
    pub fn entries(&self) -> impl Iterator<Item = &Trade> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Latest aggregate snapshot plus the running trade feed
#[derive(Debug, Default)]
pub struct MarketState {
    snapshot: Option<MarketSnapshot>,
    trade_feed: TradeFeed,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the aggregate snapshot wholesale
    pub fn apply_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// Append freshly pushed executions to the feed
    pub fn apply_trades(&mut self, batch: Vec<Trade>) {
        self.trade_feed.apply(batch);
    }

    /// Latest snapshot, if one has arrived
    pub fn snapshot(&self) -> Option<&MarketSnapshot> {
        self.snapshot.as_ref()
    }

    /// Last traded price from the latest snapshot
    pub fn last_price(&self) -> Option<f64> {
        self.snapshot.as_ref().map(|s| s.current_price)
    }

    pub fn trade_feed(&self) -> &TradeFeed {
        &self.trade_feed
    }

    /// Drop the accumulated price history after a simulation reset
    ///
    /// Only the history empties; the trade feed stays and the next
    /// `market_update` replaces everything else.
    pub fn clear_history(&mut self) {
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.price_history.clear();
        }
    }
}

/// Book rows ready for the ladder widget
#[derive(Debug, Clone, Default)]
pub struct VisibleDepth {
    /// Ask rows top-down (farthest from mid first)
    pub asks: Vec<BookLevel>,
    /// Bid rows top-down (best bid first)
    pub bids: Vec<BookLevel>,
}

/// Project the pushed book onto at most [`BOOK_DEPTH`] rows per side
///
/// Asks render above the mid, so the ten nearest are reversed to put the
/// farthest at the top; bids keep their nearest-first order.
pub fn visible_depth(book: &OrderBookSnapshot) -> VisibleDepth {
    let mut asks: Vec<BookLevel> = book.asks.iter().take(BOOK_DEPTH).cloned().collect();
    asks.reverse();
    let bids: Vec<BookLevel> = book.bids.iter().take(BOOK_DEPTH).cloned().collect();
    VisibleDepth { asks, bids }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::shared::types::TraderId;

    fn trade(price: f64, quantity: u64) -> Trade {
        Trade {
            price,
            quantity,
            timestamp: NaiveDate::from_ymd_opt(2026, 8, 23)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            buyer_id: TraderId::new("1"),
            seller_id: TraderId::new("2"),
        }
    }

    fn level(price: i64, quantity: u64) -> BookLevel {
        BookLevel {
            price: Decimal::from(price),
            quantity,
        }
    }

    fn snapshot_with_history(history: Vec<f64>) -> MarketSnapshot {
        MarketSnapshot {
            current_price: history.last().copied().unwrap_or(100.0),
            change: Some(0.0),
            change_percent: Some(0.0),
            volume: 0,
            best_bid: None,
            best_ask: None,
            spread: None,
            price_history: history,
            order_book: OrderBookSnapshot::default(),
        }
    }

    #[test]
    fn test_trade_feed_caps_at_twenty_newest_first() {
        let mut feed = TradeFeed::new();

        // One batch of three, then nineteen single-trade batches
        feed.apply(vec![trade(1.0, 1), trade(2.0, 1), trade(3.0, 1)]);
        for i in 0..19 {
            feed.apply(vec![trade(10.0 + i as f64, 1)]);
        }

        assert_eq!(feed.len(), TRADE_FEED_CAPACITY);

        let prices: Vec<f64> = feed.entries().map(|t| t.price).collect();
        // Newest single first, then the rest; only the first batch's newest
        // entry survives at the tail
        assert_eq!(prices[0], 28.0);
        assert_eq!(prices[18], 10.0);
        assert_eq!(prices[19], 3.0);
    }

    #[test]
    fn test_trade_feed_batch_order() {
        let mut feed = TradeFeed::new();
        feed.apply(vec![trade(1.0, 1), trade(2.0, 1)]);

        let prices: Vec<f64> = feed.entries().map(|t| t.price).collect();
        assert_eq!(prices, vec![2.0, 1.0]);
    }

    #[test]
    fn test_visible_depth_truncates_and_reverses_asks() {
        let book = OrderBookSnapshot {
            asks: (0..15).map(|i| level(101 + i, 10)).collect(),
            bids: (0..15).map(|i| level(99 - i, 10)).collect(),
        };

        let depth = visible_depth(&book);
        assert_eq!(depth.asks.len(), BOOK_DEPTH);
        assert_eq!(depth.bids.len(), BOOK_DEPTH);

        // Asks reversed: farthest of the kept ten first, best ask last
        assert_eq!(depth.asks[0].price, Decimal::from(110));
        assert_eq!(depth.asks[9].price, Decimal::from(101));
        // Bids keep their pushed order: best bid first
        assert_eq!(depth.bids[0].price, Decimal::from(99));
        assert_eq!(depth.bids[9].price, Decimal::from(90));
    }

    #[test]
    fn test_visible_depth_short_sides() {
        let book = OrderBookSnapshot {
            asks: vec![level(101, 5)],
            bids: Vec::new(),
        };

        let depth = visible_depth(&book);
        assert_eq!(depth.asks.len(), 1);
        assert!(depth.bids.is_empty());
    }

    #[test]
    fn test_snapshot_replaces_wholesale() {
        let mut state = MarketState::new();
        state.apply_snapshot(snapshot_with_history(vec![100.0, 101.0]));
        state.apply_snapshot(snapshot_with_history(vec![50.0]));

        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.price_history, vec![50.0]);
        assert_eq!(state.last_price(), Some(50.0));
    }

    #[test]
    fn test_clear_history_leaves_trade_feed() {
        let mut state = MarketState::new();
        state.apply_snapshot(snapshot_with_history(vec![100.0, 101.0, 102.0]));
        state.apply_trades(vec![trade(101.0, 3)]);

        state.clear_history();

        assert!(state.snapshot().unwrap().price_history.is_empty());
        assert_eq!(state.trade_feed().len(), 1);
        // Price itself survives until the next push replaces the snapshot
        assert_eq!(state.last_price(), Some(102.0));
    }

    #[test]
    fn test_clear_history_before_first_snapshot() {
        let mut state = MarketState::new();
        state.clear_history();
        assert!(state.snapshot().is_none());
    }
}
