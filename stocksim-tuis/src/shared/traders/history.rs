//! Bounded per-trader time series and the fixed-interval sampler step

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use super::state::TraderRegistry;
use crate::shared::market::MarketState;
use crate::shared::types::TraderId;

/// Samples kept per series
pub const HISTORY_CAPACITY: usize = 100;

/// Sampler period in milliseconds
pub const SAMPLE_PERIOD_MS: u64 = 2000;

/// Which series the trader chart shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Portfolio,
    Stock,
    Cash,
}

impl ChartMode {
    /// Chart title for this mode
    pub fn label(&self) -> &'static str {
        match self {
            ChartMode::Portfolio => "Portfolio Value",
            ChartMode::Stock => "Stock Value",
            ChartMode::Cash => "Cash",
        }
    }

    /// Next mode in the cycle order
    pub fn next(&self) -> ChartMode {
        match self {
            ChartMode::Portfolio => ChartMode::Stock,
            ChartMode::Stock => ChartMode::Cash,
            ChartMode::Cash => ChartMode::Portfolio,
        }
    }
}

/// Bounded sampled history for one trader
///
/// The three value series and the timestamp series advance in lockstep; all
/// four evict their oldest entry together once [`HISTORY_CAPACITY`] is
/// reached.
#[derive(Debug, Default)]
pub struct TraderSeries {
    portfolio: VecDeque<f64>,
    stock: VecDeque<f64>,
    cash: VecDeque<f64>,
    labels: VecDeque<DateTime<Utc>>,
}

impl TraderSeries {
    /// Record one sample, evicting the oldest beyond capacity
    pub fn record(&mut self, portfolio: f64, stock: f64, cash: f64, at: DateTime<Utc>) {
        self.portfolio.push_back(portfolio);
        self.stock.push_back(stock);
        self.cash.push_back(cash);
        self.labels.push_back(at);
        while self.labels.len() > HISTORY_CAPACITY {
            self.portfolio.pop_front();
            self.stock.pop_front();
            self.cash.pop_front();
            self.labels.pop_front();
        }
    }

    /// Values of the series selected by `mode`, oldest first
    pub fn values(&self, mode: ChartMode) -> impl Iterator<Item = f64> + '_ {
        match mode {
            ChartMode::Portfolio => self.portfolio.iter().copied(),
            ChartMode::Stock => self.stock.iter().copied(),
            ChartMode::Cash => self.cash.iter().copied(),
        }
    }

    /// `(index, value)` chart points for `mode`
    pub fn points(&self, mode: ChartMode) -> Vec<(f64, f64)> {
        self.values(mode)
            .enumerate()
            .map(|(i, v)| (i as f64, v))
            .collect()
    }

    /// Sample timestamps, oldest first
    pub fn labels(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// All sampled series, keyed by trader id
///
/// A series is created on a trader's first recorded sample and kept for the
/// rest of the session, so switching back to a trader restores its history.
#[derive(Debug, Default)]
pub struct HistoryBook {
    series: HashMap<TraderId, TraderSeries>,
}

impl HistoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Series for `id`, if any sample was ever recorded
    pub fn series(&self, id: &TraderId) -> Option<&TraderSeries> {
        self.series.get(id)
    }

    /// Series for `id`, created empty when missing
    pub fn series_mut(&mut self, id: &TraderId) -> &mut TraderSeries {
        self.series.entry(id.clone()).or_default()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// One sampler tick: record the selected trader's current values
///
/// The stock-value leg uses the latest pushed market price, however stale.
/// Does nothing and returns false when no trader is selected, the selection
/// does not resolve, or no market snapshot has arrived yet.
pub fn sample_selected(
    registry: &TraderRegistry,
    market: &MarketState,
    book: &mut HistoryBook,
    now: DateTime<Utc>,
) -> bool {
    let trader = match registry.selected() {
        Some(trader) => trader,
        None => return false,
    };
    let last_price = match market.last_price() {
        Some(price) => price,
        None => return false,
    };

    let stock_value = trader.shares as f64 * last_price;
    book.series_mut(&trader.id)
        .record(trader.portfolio_value, stock_value, trader.cash, now);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::shared::types::{MarketSnapshot, OrderBookSnapshot, TraderSummary};

    fn at(step: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap()
            + chrono::Duration::seconds(2 * step as i64)
    }

    fn summary(id: &str, portfolio_value: f64, shares: i64, cash: f64) -> TraderSummary {
        TraderSummary {
            id: TraderId::new(id),
            cash,
            shares,
            portfolio_value,
            pnl: 0.0,
            pnl_percent: 0.0,
            total_volume_traded: 0,
            open_orders: Vec::new(),
            trade_history: Vec::new(),
        }
    }

    fn market_at(price: f64) -> MarketState {
        let mut market = MarketState::new();
        market.apply_snapshot(MarketSnapshot {
            current_price: price,
            change: None,
            change_percent: None,
            volume: 0,
            best_bid: None,
            best_ask: None,
            spread: None,
            price_history: vec![price],
            order_book: OrderBookSnapshot::default(),
        });
        market
    }

    #[test]
    fn test_series_evicts_oldest_in_lockstep() {
        let mut series = TraderSeries::default();
        for i in 0..(HISTORY_CAPACITY + 10) {
            series.record(i as f64, i as f64 * 2.0, i as f64 * 3.0, at(i));
        }

        assert_eq!(series.len(), HISTORY_CAPACITY);
        assert_eq!(series.values(ChartMode::Portfolio).count(), HISTORY_CAPACITY);
        assert_eq!(series.values(ChartMode::Stock).count(), HISTORY_CAPACITY);
        assert_eq!(series.values(ChartMode::Cash).count(), HISTORY_CAPACITY);
        assert_eq!(series.labels().count(), HISTORY_CAPACITY);

        // Entries 0..10 were evicted first
        assert_eq!(series.values(ChartMode::Portfolio).next(), Some(10.0));
        assert_eq!(series.values(ChartMode::Stock).next(), Some(20.0));
        assert_eq!(series.values(ChartMode::Cash).next(), Some(30.0));
        assert_eq!(series.labels().next(), Some(&at(10)));
    }

    #[test]
    fn test_sample_selected_records_resolved_selection() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![summary("1", 10050.0, 5, 9550.0)]);
        registry.select(Some(TraderId::new("1")));
        let market = market_at(100.0);
        let mut book = HistoryBook::new();

        for step in 0..3 {
            assert!(sample_selected(&registry, &market, &mut book, at(step)));
        }

        let series = book.series(&TraderId::new("1")).unwrap();
        assert_eq!(series.len(), 3);
        let stock: Vec<f64> = series.values(ChartMode::Stock).collect();
        assert_eq!(stock, vec![500.0, 500.0, 500.0]);
        let cash: Vec<f64> = series.values(ChartMode::Cash).collect();
        assert_eq!(cash, vec![9550.0, 9550.0, 9550.0]);
    }

    #[test]
    fn test_sample_selected_no_ops() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![summary("1", 10000.0, 0, 10000.0)]);
        let market = market_at(100.0);
        let mut book = HistoryBook::new();

        // Nothing selected
        assert!(!sample_selected(&registry, &market, &mut book, at(0)));

        // Selection does not resolve
        registry.select(Some(TraderId::new("404")));
        assert!(!sample_selected(&registry, &market, &mut book, at(1)));

        // No market snapshot yet
        registry.select(Some(TraderId::new("1")));
        let empty_market = MarketState::new();
        assert!(!sample_selected(&registry, &empty_market, &mut book, at(2)));

        assert!(book.is_empty());
    }

    #[test]
    fn test_history_book_isolates_traders() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![
            summary("1", 10000.0, 0, 10000.0),
            summary("2", 20000.0, 0, 20000.0),
        ]);
        let market = market_at(100.0);
        let mut book = HistoryBook::new();

        registry.select(Some(TraderId::new("1")));
        sample_selected(&registry, &market, &mut book, at(0));
        sample_selected(&registry, &market, &mut book, at(1));

        registry.select(Some(TraderId::new("2")));
        sample_selected(&registry, &market, &mut book, at(2));

        // Switching back finds trader 1's series intact
        assert_eq!(book.series(&TraderId::new("1")).unwrap().len(), 2);
        assert_eq!(book.series(&TraderId::new("2")).unwrap().len(), 1);
    }

    #[test]
    fn test_chart_mode_cycle_and_labels() {
        assert_eq!(ChartMode::default(), ChartMode::Portfolio);
        assert_eq!(ChartMode::Portfolio.next(), ChartMode::Stock);
        assert_eq!(ChartMode::Stock.next(), ChartMode::Cash);
        assert_eq!(ChartMode::Cash.next(), ChartMode::Portfolio);
        assert_eq!(ChartMode::Portfolio.label(), "Portfolio Value");
    }

    #[test]
    fn test_points_index_value_pairs() {
        let mut series = TraderSeries::default();
        series.record(10.0, 0.0, 10.0, at(0));
        series.record(12.0, 0.0, 12.0, at(1));

        let points = series.points(ChartMode::Portfolio);
        assert_eq!(points, vec![(0.0, 10.0), (1.0, 12.0)]);
    }
}
