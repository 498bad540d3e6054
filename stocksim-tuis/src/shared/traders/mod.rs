//! Trader view: registry, detail projection, sampled history, widgets
//!
//! Provides:
//! - Wholesale-replaced trader registry with filter/sort/selection
//! - Pure detail projection for the selected trader
//! - Bounded per-trader time series fed by the 2s sampler
//! - Ratatui widgets for the trader dashboard binary

mod detail;
mod history;
mod state;
mod widget;

pub use detail::{OrderRow, TradeRow, TraderDetail};
pub use history::{
    sample_selected, ChartMode, HistoryBook, TraderSeries, HISTORY_CAPACITY, SAMPLE_PERIOD_MS,
};
pub use state::{SortKey, TraderRegistry};
pub use widget::{
    render_trader_chart, render_trader_detail, render_trader_header, render_trader_list,
};
