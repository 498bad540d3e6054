//! Ratatui widgets for the market dashboard

use std::sync::OnceLock;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use tracing::warn;

use super::chart;
use super::state::{visible_depth, MarketState, TradeFeed};
use crate::shared::classify::{classify, Direction};
use crate::shared::fmt;
use crate::shared::websocket::ConnectionStatus;

// Up/down/neutral match the web palette; the rest is chrome
const C_UP: Color = Color::Rgb(16, 185, 129);
const C_DOWN: Color = Color::Rgb(239, 68, 68);
const C_NEUTRAL: Color = Color::Rgb(136, 136, 136);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);

static SMALL_CHART_WARNED: OnceLock<()> = OnceLock::new();

fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::Up => C_UP,
        Direction::Down => C_DOWN,
        Direction::Neutral => C_NEUTRAL,
    }
}

/// Render the aggregate stats strip: price, change, volume, bid/ask/spread
pub fn render_market_stats(
    f: &mut Frame,
    area: Rect,
    state: &MarketState,
    status: ConnectionStatus,
    running: bool,
) {
    let border_color = match status {
        ConnectionStatus::Connected => C_ACCENT,
        ConnectionStatus::Disconnected => C_DOWN,
    };

    let block = Block::default()
        .title(" MARKET ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();

    match state.snapshot() {
        Some(snapshot) => {
            let (change_text, change_color) = match (snapshot.change, snapshot.change_percent)
            {
                (Some(change), Some(pct)) => {
                    let direction = classify(0.0, change);
                    (
                        format!(
                            " {} {} ({})",
                            direction.arrow(),
                            fmt::signed_currency(change),
                            fmt::percent(pct)
                        ),
                        direction_color(direction),
                    )
                }
                _ => (" -".to_string(), C_DIM),
            };

            lines.push(Line::from(vec![
                Span::styled("PRICE   ", Style::default().fg(C_DIM)),
                Span::styled(
                    fmt::currency(snapshot.current_price),
                    Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                ),
                Span::styled(change_text, Style::default().fg(change_color)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("VOLUME  ", Style::default().fg(C_DIM)),
                Span::styled(fmt::quantity(snapshot.volume), Style::default().fg(C_BRIGHT)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("BID     ", Style::default().fg(C_DIM)),
                Span::styled(
                    fmt::currency_or_dash(snapshot.best_bid),
                    Style::default().fg(C_UP),
                ),
                Span::styled("  ASK ", Style::default().fg(C_DIM)),
                Span::styled(
                    fmt::currency_or_dash(snapshot.best_ask),
                    Style::default().fg(C_DOWN),
                ),
                Span::styled("  SPREAD ", Style::default().fg(C_DIM)),
                Span::styled(
                    fmt::currency_or_dash(snapshot.spread),
                    Style::default().fg(C_BRIGHT),
                ),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Waiting for market data...",
                Style::default().fg(C_DIM),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(""));
        }
    }

    let (sim_label, sim_color) = if running {
        ("RUNNING", C_UP)
    } else {
        ("IDLE", C_DIM)
    };
    let feed_label = match status {
        ConnectionStatus::Connected => "LIVE",
        ConnectionStatus::Disconnected => "OFFLINE",
    };
    lines.push(Line::from(vec![
        Span::styled("SIM     ", Style::default().fg(C_DIM)),
        Span::styled(
            sim_label,
            Style::default().fg(sim_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  FEED ", Style::default().fg(C_DIM)),
        Span::styled(feed_label, Style::default().fg(border_color)),
        Span::styled(
            "  [s]tart [x]stop [r]eset [q]uit",
            Style::default().fg(C_DIM),
        ),
    ]));

    f.render_widget(Paragraph::new(lines), inner);
}

/// Render the price chart: one colored line per adjacent pair plus point
/// markers, all classified by the same up/down rule
///
/// With fewer than two samples there is nothing to connect, so a
/// placeholder paragraph takes the chart's place.
pub fn render_price_chart(f: &mut Frame, area: Rect, state: &MarketState) {
    let block = Block::default()
        .title(" STOCK PRICE ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 10 || inner.height < 3 {
        // Not enough room for axes; skip the draw and say so once
        if SMALL_CHART_WARNED.set(()).is_ok() {
            warn!(
                "price chart area {}x{} too small to render",
                inner.width, inner.height
            );
        }
        return;
    }

    let history: &[f64] = state
        .snapshot()
        .map(|s| s.price_history.as_slice())
        .unwrap_or(&[]);

    if history.len() < 2 {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Waiting for price data...",
                Style::default().fg(C_DIM),
            ))),
            inner,
        );
        return;
    }

    let segments = chart::segments(history);
    let points = chart::points_by_direction(history);
    let x_bounds = chart::x_bounds(history.len());
    let y_bounds = chart::y_bounds(history);
    let y_labels = chart::y_labels(y_bounds);

    // One two-point line dataset per segment keeps per-pair coloring exact
    let segment_data: Vec<[(f64, f64); 2]> =
        segments.iter().map(|s| [s.from, s.to]).collect();
    let mut datasets: Vec<Dataset> = segment_data
        .iter()
        .zip(segments.iter())
        .map(|(data, segment)| {
            Dataset::default()
                .graph_type(GraphType::Line)
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(direction_color(segment.direction)))
                .data(data)
        })
        .collect();

    for (data, direction) in [
        (&points.up, Direction::Up),
        (&points.down, Direction::Down),
        (&points.neutral, Direction::Neutral),
    ] {
        if !data.is_empty() {
            datasets.push(
                Dataset::default()
                    .graph_type(GraphType::Scatter)
                    .marker(symbols::Marker::Dot)
                    .style(Style::default().fg(direction_color(direction)))
                    .data(data),
            );
        }
    }

    let chart_widget = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .bounds(x_bounds)
                .style(Style::default().fg(C_DIM)),
        )
        .y_axis(
            Axis::default()
                .bounds(y_bounds)
                .labels(y_labels)
                .style(Style::default().fg(C_DIM)),
        );
    f.render_widget(chart_widget, inner);
}

/// Render the order book ladder: top asks above top bids
pub fn render_order_book(f: &mut Frame, area: Rect, state: &MarketState) {
    let block = Block::default()
        .title(" ORDER BOOK ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let snapshot = match state.snapshot() {
        Some(snapshot) => snapshot,
        None => {
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "No depth yet.",
                    Style::default().fg(C_DIM),
                ))),
                inner,
            );
            return;
        }
    };

    let depth = visible_depth(&snapshot.order_book);
    let mut lines = Vec::with_capacity(depth.asks.len() + depth.bids.len() + 2);

    lines.push(Line::from(Span::styled(
        format!("{:>10}  {:>8}", "PRICE", "QTY"),
        Style::default().fg(C_DIM),
    )));

    for level in &depth.asks {
        lines.push(Line::from(Span::styled(
            format!(
                "{:>10}  {:>8}",
                fmt::currency(level.price_f64()),
                level.quantity
            ),
            Style::default().fg(C_DOWN),
        )));
    }

    if depth.asks.is_empty() && depth.bids.is_empty() {
        lines.push(Line::from(Span::styled(
            "Book is empty.",
            Style::default().fg(C_DIM),
        )));
    } else {
        let rule_width = (inner.width as usize).saturating_sub(2).max(4);
        lines.push(Line::from(Span::styled(
            "─".repeat(rule_width),
            Style::default().fg(C_DIM),
        )));
    }

    for level in &depth.bids {
        lines.push(Line::from(Span::styled(
            format!(
                "{:>10}  {:>8}",
                fmt::currency(level.price_f64()),
                level.quantity
            ),
            Style::default().fg(C_UP),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Render the rolling trade feed, newest first
pub fn render_trade_feed(f: &mut Frame, area: Rect, feed: &TradeFeed) {
    let block = Block::default()
        .title(" LIVE TRADES ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if feed.is_empty() {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No trades yet.",
                Style::default().fg(C_DIM),
            ))),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = feed
        .entries()
        .take(inner.height as usize)
        .map(|trade| {
            Line::from(vec![
                Span::styled(
                    trade.timestamp.format("%H:%M:%S").to_string(),
                    Style::default().fg(C_DIM),
                ),
                Span::styled(
                    format!("  {:>9}", fmt::currency(trade.price)),
                    Style::default().fg(C_BRIGHT),
                ),
                Span::styled(format!(" x{:<5}", trade.quantity), Style::default().fg(C_DIM)),
                Span::styled(
                    format!(" {} bought from {}", trade.buyer_id, trade.seller_id),
                    Style::default().fg(C_DIM),
                ),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}
