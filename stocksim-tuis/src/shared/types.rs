/// Core data types for simulation feed events
///
/// These types match the JSON message format pushed by the stocksim server
/// at ws://127.0.0.1:5000/ws

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical trader identifier
///
/// The backend is loose about id representation (numeric in some payloads,
/// string in others), so deserialization normalizes every form to one string
/// up front and comparison after that is plain equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TraderId(String);

impl TraderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TraderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for TraderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct IdVisitor;

        impl<'de> serde::de::Visitor<'de> for IdVisitor {
            type Value = TraderId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a trader id as string or number")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(TraderId(v.to_string()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(TraderId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(TraderId(v.to_string()))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
                // Integral floats (5.0) normalize to the same form as 5
                if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    Ok(TraderId((v as i64).to_string()))
                } else {
                    Ok(TraderId(v.to_string()))
                }
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        }
    }

    /// Check if this is a buy
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Check if this is a sell
    pub fn is_sell(&self) -> bool {
        matches!(self, Side::Sell)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price/quantity level in the order book
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookLevel {
    /// Price level
    pub price: Decimal,
    /// Shares resting at this level
    pub quantity: u64,
}

impl BookLevel {
    /// Convert price to f64 for calculations
    pub fn price_f64(&self) -> f64 {
        self.price.to_string().parse().unwrap_or(0.0)
    }
}

/// Resting depth, both sides nearest-to-mid first
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrderBookSnapshot {
    /// Sell side, lowest ask first
    #[serde(default)]
    pub asks: Vec<BookLevel>,
    /// Buy side, highest bid first
    #[serde(default)]
    pub bids: Vec<BookLevel>,
}

/// Aggregate market snapshot pushed on every simulation step
///
/// Each push replaces the previous snapshot wholesale. Fields the server
/// cannot compute yet (empty book, no trades) arrive as null.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketSnapshot {
    /// Last traded price
    pub current_price: f64,
    /// Absolute change vs the starting price
    #[serde(default)]
    pub change: Option<f64>,
    /// Percent change vs the starting price
    #[serde(default)]
    pub change_percent: Option<f64>,
    /// Total shares traded this session
    #[serde(default)]
    pub volume: u64,
    /// Best bid price, if the buy side is quoted
    #[serde(default)]
    pub best_bid: Option<f64>,
    /// Best ask price, if the sell side is quoted
    #[serde(default)]
    pub best_ask: Option<f64>,
    /// Ask minus bid, if both sides are quoted
    #[serde(default)]
    pub spread: Option<f64>,
    /// Price at each completed simulation step, oldest first
    #[serde(default)]
    pub price_history: Vec<f64>,
    /// Current resting depth
    #[serde(default)]
    pub order_book: OrderBookSnapshot,
}

/// A single executed trade
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Trade {
    /// Execution price
    pub price: f64,
    /// Shares exchanged
    pub quantity: u64,
    /// Execution time (server local, ISO 8601 without offset)
    pub timestamp: NaiveDateTime,
    /// Trader who bought
    pub buyer_id: TraderId,
    /// Trader who sold
    pub seller_id: TraderId,
}

impl Trade {
    /// Side of this trade from `trader`'s point of view
    pub fn side_for(&self, trader: &TraderId) -> Side {
        if &self.buyer_id == trader {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// A trader's resting order
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenOrder {
    /// Order side (wire field is `type`)
    #[serde(rename = "type")]
    pub side: Side,
    /// Limit price
    pub price: f64,
    /// Unfilled quantity
    pub quantity: u64,
}

/// Per-trader portfolio summary pushed with every `traders_update`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraderSummary {
    /// Trader identifier
    pub id: TraderId,
    /// Cash on hand
    pub cash: f64,
    /// Shares held
    pub shares: i64,
    /// Cash plus shares at the last price
    pub portfolio_value: f64,
    /// Profit and loss vs starting capital
    pub pnl: f64,
    /// PnL as a percentage of starting capital
    pub pnl_percent: f64,
    /// Lifetime shares traded
    #[serde(default)]
    pub total_volume_traded: u64,
    /// Resting orders
    #[serde(default)]
    pub open_orders: Vec<OpenOrder>,
    /// Most recent executions, oldest first (server caps at 100)
    #[serde(default)]
    pub trade_history: Vec<Trade>,
}

/// Push-channel message envelope from the simulation server
///
/// Tagged by `event`, payload under `data`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum FeedMessage {
    /// Wholesale market replacement
    MarketUpdate(MarketSnapshot),
    /// Ordered batch of fresh executions
    NewTrades(Vec<Trade>),
    /// Wholesale trader-collection replacement
    TradersUpdate(Vec<TraderSummary>),
}

/// Event delivered to the state stores, independent of transport
///
/// Anything that can produce these (the WebSocket client, a poller, a test
/// constructing them directly) can drive the dashboards.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Push channel is up
    Connected,
    /// Push channel dropped (the client retries on its own)
    Disconnected,
    /// Market snapshot replacement
    Market(MarketSnapshot),
    /// Fresh executions
    Trades(Vec<Trade>),
    /// Trader collection replacement
    Traders(Vec<TraderSummary>),
}

impl From<FeedMessage> for FeedEvent {
    fn from(message: FeedMessage) -> Self {
        match message {
            FeedMessage::MarketUpdate(snapshot) => FeedEvent::Market(snapshot),
            FeedMessage::NewTrades(trades) => FeedEvent::Trades(trades),
            FeedMessage::TradersUpdate(traders) => FeedEvent::Traders(traders),
        }
    }
}
