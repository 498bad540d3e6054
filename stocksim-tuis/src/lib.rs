/// Stocksim TUIs - Shared Library
///
/// This library provides common functionality for the two TUI binaries:
/// - market-dashboard: live price chart, order book depth, trade feed
/// - trader-dashboard: trader list, detail view, sampled history charts
///
/// The library includes:
/// - Wire types for the simulation feed and the feed-event seam
/// - WebSocket client for the push channel and HTTP control client
/// - Bounded state stores, pure render projections, and ratatui widgets
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{
    BookLevel, FeedEvent, FeedMessage, MarketSnapshot, OpenOrder, OrderBookSnapshot, Side, Trade,
    TraderId, TraderSummary,
};

pub use shared::classify::{classify, classify_series, Direction};

pub use shared::websocket::{ConnectionStatus, FeedClient, FeedConfig};

pub use shared::control::ControlClient;
pub use shared::error::{ControlAction, ControlError};

pub use shared::session::{DashboardSession, Stores};

pub use shared::market::{
    visible_depth, MarketState, TradeFeed, VisibleDepth, BOOK_DEPTH, TRADE_FEED_CAPACITY,
};

pub use shared::traders::{
    sample_selected, ChartMode, HistoryBook, SortKey, TraderDetail, TraderRegistry, TraderSeries,
    HISTORY_CAPACITY, SAMPLE_PERIOD_MS,
};
