//! Market view: aggregate snapshot state, chart projection, widgets
//!
//! Provides:
//! - Bounded market state (latest snapshot + trade feed)
//! - Pure price-chart projection colored per adjacent pair
//! - Ratatui widgets for the market dashboard binary

mod chart;
mod state;
mod widget;

pub use chart::{
    points_by_direction, segments, x_bounds, y_bounds, y_labels, DirectionPoints, Segment,
};
pub use state::{
    visible_depth, MarketState, TradeFeed, VisibleDepth, BOOK_DEPTH, TRADE_FEED_CAPACITY,
};
pub use widget::{
    render_market_stats, render_order_book, render_price_chart, render_trade_feed,
};
