//! Trader registry: wholesale replacement, filter/sort projection, selection

use tracing::debug;

use crate::shared::types::{TraderId, TraderSummary};

/// Sort field for the trader list, cycled from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    PortfolioValue,
    Pnl,
    PnlPercent,
    Cash,
    Shares,
}

impl SortKey {
    /// Column label shown in the list header
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::PortfolioValue => "Portfolio",
            SortKey::Pnl => "PnL",
            SortKey::PnlPercent => "PnL %",
            SortKey::Cash => "Cash",
            SortKey::Shares => "Shares",
        }
    }

    /// Next key in the cycle order
    pub fn next(&self) -> SortKey {
        match self {
            SortKey::PortfolioValue => SortKey::Pnl,
            SortKey::Pnl => SortKey::PnlPercent,
            SortKey::PnlPercent => SortKey::Cash,
            SortKey::Cash => SortKey::Shares,
            SortKey::Shares => SortKey::PortfolioValue,
        }
    }

    /// Numeric field this key sorts by
    fn value(&self, trader: &TraderSummary) -> f64 {
        match self {
            SortKey::PortfolioValue => trader.portfolio_value,
            SortKey::Pnl => trader.pnl,
            SortKey::PnlPercent => trader.pnl_percent,
            SortKey::Cash => trader.cash,
            SortKey::Shares => trader.shares as f64,
        }
    }
}

/// All known traders plus the current selection
///
/// The collection is replaced wholesale on every `traders_update`. The
/// selection is the only state that survives a replace, and only while its
/// id still resolves.
#[derive(Debug, Default)]
pub struct TraderRegistry {
    traders: Vec<TraderSummary>,
    selected: Option<TraderId>,
}

impl TraderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection wholesale
    ///
    /// Clears the selection in the same call when the selected id no longer
    /// resolves. Returns true when that happened, so callers can log it.
    pub fn replace(&mut self, traders: Vec<TraderSummary>) -> bool {
        self.traders = traders;
        let stale = self
            .selected
            .as_ref()
            .map(|id| !self.traders.iter().any(|t| &t.id == id))
            .unwrap_or(false);
        if stale {
            if let Some(id) = self.selected.take() {
                debug!("selected trader {} no longer present, selection cleared", id);
            }
        }
        stale
    }

    /// Traders matching `search`, sorted descending by `sort_key`
    ///
    /// The filter is a case-insensitive substring match on the id. The sort
    /// is stable, so equal keys keep their pushed order.
    pub fn visible(&self, search: &str, sort_key: SortKey) -> Vec<&TraderSummary> {
        let needle = search.to_lowercase();
        let mut visible: Vec<&TraderSummary> = self
            .traders
            .iter()
            .filter(|t| needle.is_empty() || t.id.as_str().to_lowercase().contains(&needle))
            .collect();
        visible.sort_by(|a, b| sort_key.value(b).total_cmp(&sort_key.value(a)));
        visible
    }

    /// Change or clear the selection
    pub fn select(&mut self, id: Option<TraderId>) {
        self.selected = id;
    }

    /// Currently selected id, if any
    pub fn selected_id(&self) -> Option<&TraderId> {
        self.selected.as_ref()
    }

    /// Resolve the selection against the current collection
    pub fn selected(&self) -> Option<&TraderSummary> {
        let id = self.selected.as_ref()?;
        self.traders.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.traders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, portfolio_value: f64, pnl: f64) -> TraderSummary {
        TraderSummary {
            id: TraderId::new(id),
            cash: 0.0,
            shares: 0,
            portfolio_value,
            pnl,
            pnl_percent: 0.0,
            total_volume_traded: 0,
            open_orders: Vec::new(),
            trade_history: Vec::new(),
        }
    }

    #[test]
    fn test_sort_descending_by_pnl() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![
            summary("1", 0.0, 5.0),
            summary("2", 0.0, -2.0),
            summary("3", 0.0, 10.0),
        ]);

        let visible = registry.visible("", SortKey::Pnl);
        let pnls: Vec<f64> = visible.iter().map(|t| t.pnl).collect();
        assert_eq!(pnls, vec![10.0, 5.0, -2.0]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![
            summary("a", 100.0, 0.0),
            summary("b", 100.0, 0.0),
            summary("c", 200.0, 0.0),
        ]);

        let ids: Vec<&str> = registry
            .visible("", SortKey::PortfolioValue)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_search_filters_by_substring_keeping_order() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![
            summary("101", 0.0, 0.0),
            summary("201", 0.0, 0.0),
            summary("102", 0.0, 0.0),
        ]);

        let ids: Vec<&str> = registry
            .visible("10", SortKey::PortfolioValue)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["101", "102"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![summary("MM-1", 0.0, 0.0), summary("rt-2", 0.0, 0.0)]);

        let visible = registry.visible("mm", SortKey::PortfolioValue);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "MM-1");
    }

    #[test]
    fn test_replace_clears_stale_selection() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![summary("5", 0.0, 0.0), summary("6", 0.0, 0.0)]);
        registry.select(Some(TraderId::new("5")));
        assert!(registry.selected().is_some());

        // New collection without id 5; the same call drops the selection
        let dropped = registry.replace(vec![summary("6", 0.0, 0.0)]);
        assert!(dropped);
        assert!(registry.selected_id().is_none());
        assert!(registry.selected().is_none());
    }

    #[test]
    fn test_replace_keeps_resolving_selection() {
        let mut registry = TraderRegistry::new();
        registry.replace(vec![summary("5", 100.0, 0.0)]);
        registry.select(Some(TraderId::new("5")));

        let dropped = registry.replace(vec![summary("5", 150.0, 0.0)]);
        assert!(!dropped);
        // Resolution always reads the freshest collection
        assert_eq!(registry.selected().unwrap().portfolio_value, 150.0);
    }

    #[test]
    fn test_sort_key_cycle_covers_all_keys() {
        let mut key = SortKey::default();
        let mut seen = vec![key];
        for _ in 0..4 {
            key = key.next();
            seen.push(key);
        }
        assert_eq!(key.next(), SortKey::default());
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }
}
