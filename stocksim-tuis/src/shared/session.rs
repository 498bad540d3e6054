//! Dashboard session: store ownership, event pump, history sampler
//!
//! One session per binary. The session owns the per-domain stores behind
//! async mutexes, applies feed events to them in arrival order with no
//! coalescing, publishes a revision counter and a connection status for
//! render loops, and runs the fixed-interval history sampler as an owned,
//! cancellable task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::shared::market::MarketState;
use crate::shared::traders::{sample_selected, HistoryBook, TraderRegistry, SAMPLE_PERIOD_MS};
use crate::shared::types::{FeedEvent, TraderSummary};
use crate::shared::websocket::ConnectionStatus;

/// Shared handles to every store a dashboard renders from
///
/// Lock order where more than one is held: traders, then market, then
/// history.
#[derive(Clone)]
pub struct Stores {
    pub market: Arc<Mutex<MarketState>>,
    pub traders: Arc<Mutex<TraderRegistry>>,
    pub history: Arc<Mutex<HistoryBook>>,
}

impl Stores {
    fn new() -> Self {
        Self {
            market: Arc::new(Mutex::new(MarketState::new())),
            traders: Arc::new(Mutex::new(TraderRegistry::new())),
            history: Arc::new(Mutex::new(HistoryBook::new())),
        }
    }
}

/// Owns the event pump and sampler tasks for one dashboard process
///
/// Dropping the session aborts both tasks.
pub struct DashboardSession {
    stores: Stores,
    revision_rx: watch::Receiver<u64>,
    status_rx: watch::Receiver<ConnectionStatus>,
    pump: JoinHandle<()>,
    sampler: JoinHandle<()>,
    sampler_shutdown: mpsc::Sender<()>,
}

impl DashboardSession {
    /// Start the event pump over `events` and the 2s history sampler
    pub fn start(events: mpsc::Receiver<FeedEvent>) -> Self {
        let stores = Stores::new();
        let (revision_tx, revision_rx) = watch::channel(0u64);
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);

        let pump = spawn_event_pump(stores.clone(), events, revision_tx, status_tx);
        let (sampler, sampler_shutdown) = spawn_sampler(stores.clone());

        Self {
            stores,
            revision_rx,
            status_rx,
            pump,
            sampler,
            sampler_shutdown,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Bumped after every applied feed event; render loops can watch it
    pub fn revision(&self) -> watch::Receiver<u64> {
        self.revision_rx.clone()
    }

    /// Current push-channel status
    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Apply traders fetched over HTTP, same as a pushed `traders_update`
    pub async fn apply_traders(&self, traders: Vec<TraderSummary>) {
        let mut registry = self.stores.traders.lock().await;
        registry.replace(traders);
    }

    /// Stop the history sampler without tearing the session down
    pub async fn shutdown_sampler(&self) {
        let _ = self.sampler_shutdown.send(()).await;
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.pump.abort();
        self.sampler.abort();
    }
}

/// Apply each event atomically, in arrival order, then bump the revision
fn spawn_event_pump(
    stores: Stores,
    mut events: mpsc::Receiver<FeedEvent>,
    revision_tx: watch::Sender<u64>,
    status_tx: watch::Sender<ConnectionStatus>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut revision = 0u64;
        while let Some(event) = events.recv().await {
            match event {
                FeedEvent::Connected => {
                    info!("Feed connected");
                    let _ = status_tx.send(ConnectionStatus::Connected);
                }
                FeedEvent::Disconnected => {
                    info!("Feed disconnected");
                    let _ = status_tx.send(ConnectionStatus::Disconnected);
                }
                FeedEvent::Market(snapshot) => {
                    let mut market = stores.market.lock().await;
                    market.apply_snapshot(snapshot);
                }
                FeedEvent::Trades(trades) => {
                    let mut market = stores.market.lock().await;
                    market.apply_trades(trades);
                }
                FeedEvent::Traders(traders) => {
                    let mut registry = stores.traders.lock().await;
                    registry.replace(traders);
                }
            }
            revision = revision.wrapping_add(1);
            let _ = revision_tx.send(revision);
        }
        debug!("Feed channel closed, event pump exiting");
    })
}

/// Sample the selected trader every [`SAMPLE_PERIOD_MS`] until shut down
fn spawn_sampler(stores: Stores) -> (JoinHandle<()>, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(SAMPLE_PERIOD_MS));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let registry = stores.traders.lock().await;
                    let market = stores.market.lock().await;
                    let mut history = stores.history.lock().await;
                    sample_selected(&registry, &market, &mut history, Utc::now());
                }
                _ = shutdown_rx.recv() => {
                    debug!("History sampler shutting down");
                    break;
                }
            }
        }
    });

    (handle, shutdown_tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::shared::types::{MarketSnapshot, OrderBookSnapshot, Trade, TraderId};

    fn market_snapshot(price: f64) -> MarketSnapshot {
        MarketSnapshot {
            current_price: price,
            change: None,
            change_percent: None,
            volume: 0,
            best_bid: None,
            best_ask: None,
            spread: None,
            price_history: vec![price],
            order_book: OrderBookSnapshot::default(),
        }
    }

    fn trade(price: f64) -> Trade {
        Trade {
            price,
            quantity: 1,
            timestamp: NaiveDate::from_ymd_opt(2026, 8, 23)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            buyer_id: TraderId::new("1"),
            seller_id: TraderId::new("2"),
        }
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

    async fn wait_for_revision(session: &DashboardSession, target: u64) {
        let mut revision = session.revision();
        while *revision.borrow() < target {
            revision.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_event_pump_applies_events_in_order() {
        let (tx, rx) = mpsc::channel(16);
        let session = DashboardSession::start(rx);

        tx.send(FeedEvent::Connected).await.unwrap();
        tx.send(FeedEvent::Market(market_snapshot(50.0))).await.unwrap();
        tx.send(FeedEvent::Trades(vec![trade(50.0)])).await.unwrap();
        tx.send(FeedEvent::Traders(vec![summary("1", 10000.0, 0, 10000.0)]))
            .await
            .unwrap();

        wait_for_revision(&session, 4).await;

        assert_eq!(session.status(), ConnectionStatus::Connected);
        {
            let market = session.stores().market.lock().await;
            assert_eq!(market.last_price(), Some(50.0));
            assert_eq!(market.trade_feed().len(), 1);
        }
        {
            let registry = session.stores().traders.lock().await;
            assert_eq!(registry.len(), 1);
        }

        tx.send(FeedEvent::Disconnected).await.unwrap();
        wait_for_revision(&session, 5).await;
        assert_eq!(session.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_traders_update_drops_stale_selection() {
        let (tx, rx) = mpsc::channel(16);
        let session = DashboardSession::start(rx);

        tx.send(FeedEvent::Traders(vec![
            summary("5", 10000.0, 0, 10000.0),
            summary("6", 10000.0, 0, 10000.0),
        ]))
        .await
        .unwrap();
        wait_for_revision(&session, 1).await;

        {
            let mut registry = session.stores().traders.lock().await;
            registry.select(Some(TraderId::new("5")));
        }

        tx.send(FeedEvent::Traders(vec![summary("6", 10000.0, 0, 10000.0)]))
            .await
            .unwrap();
        wait_for_revision(&session, 2).await;

        let registry = session.stores().traders.lock().await;
        assert!(registry.selected_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_records_and_shuts_down() {
        let (tx, rx) = mpsc::channel(16);
        let session = DashboardSession::start(rx);

        tx.send(FeedEvent::Market(market_snapshot(100.0))).await.unwrap();
        tx.send(FeedEvent::Traders(vec![summary("1", 10500.0, 5, 10000.0)]))
            .await
            .unwrap();
        wait_for_revision(&session, 2).await;

        {
            let mut registry = session.stores().traders.lock().await;
            registry.select(Some(TraderId::new("1")));
        }

        // Two full sampler periods after selection
        tokio::time::sleep(Duration::from_millis(SAMPLE_PERIOD_MS * 2 + 50)).await;
        let len_before = {
            let history = session.stores().history.lock().await;
            history.series(&TraderId::new("1")).unwrap().len()
        };
        assert!(len_before >= 2);

        // After shutdown the series stops growing
        session.shutdown_sampler().await;
        tokio::time::sleep(Duration::from_millis(SAMPLE_PERIOD_MS * 3)).await;

        let history = session.stores().history.lock().await;
        assert_eq!(history.series(&TraderId::new("1")).unwrap().len(), len_before);
    }
}
