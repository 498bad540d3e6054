//! Ratatui widgets for the trader dashboard

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

use super::detail::TraderDetail;
use super::history::{ChartMode, HistoryBook};
use super::state::SortKey;
use crate::shared::fmt;
use crate::shared::market::{x_bounds, y_bounds, y_labels};
use crate::shared::types::{TraderId, TraderSummary};
use crate::shared::websocket::ConnectionStatus;

const C_UP: Color = Color::Rgb(16, 185, 129);
const C_DOWN: Color = Color::Rgb(239, 68, 68);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_SELECTED_BG: Color = Color::Rgb(40, 60, 80);

static SMALL_CHART_WARNED: OnceLock<()> = OnceLock::new();

/// Render the header strip: feed status, trader count, key bindings
pub fn render_trader_header(
    f: &mut Frame,
    area: Rect,
    status: ConnectionStatus,
    trader_count: usize,
) {
    let (feed_label, feed_color) = match status {
        ConnectionStatus::Connected => ("LIVE", C_ACCENT),
        ConnectionStatus::Disconnected => ("OFFLINE", C_DOWN),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(feed_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                "TRADER DASHBOARD  ",
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{} traders  ", trader_count), Style::default().fg(C_DIM)),
            Span::styled(feed_label, Style::default().fg(feed_color)),
            Span::styled(
                "  [/] search  [Tab] sort  [m] chart  [↑/↓] select  [q] quit",
                Style::default().fg(C_DIM),
            ),
        ])),
        inner,
    );
}

/// Render the filtered, sorted trader list with the selection highlighted
pub fn render_trader_list(
    f: &mut Frame,
    area: Rect,
    visible: &[&TraderSummary],
    selected: Option<&TraderId>,
    search: &str,
    searching: bool,
    sort_key: SortKey,
) {
    let title = format!(" TRADERS ({})  sort: {} ", visible.len(), sort_key.label());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::with_capacity(visible.len() + 2);

    let search_line = if searching {
        format!("search: {}_", search)
    } else if search.is_empty() {
        "search: (press / to filter)".to_string()
    } else {
        format!("search: {}", search)
    };
    lines.push(Line::from(Span::styled(
        search_line,
        Style::default().fg(if searching { C_BRIGHT } else { C_DIM }),
    )));

    lines.push(Line::from(Span::styled(
        format!("{:<8} {:>12} {:>12} {:>8}", "ID", "PORTFOLIO", "PNL", "SHARES"),
        Style::default().fg(C_DIM),
    )));

    let rows_available = (inner.height as usize).saturating_sub(2);
    for trader in visible.iter().take(rows_available) {
        let is_selected = selected.map(|id| id == &trader.id).unwrap_or(false);
        let row_style = if is_selected {
            Style::default().bg(C_SELECTED_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let pnl_color = if trader.pnl >= 0.0 { C_UP } else { C_DOWN };

        lines.push(Line::from(vec![
            Span::styled(format!("{:<8}", trader.id.as_str()), row_style.fg(C_BRIGHT)),
            Span::styled(
                format!(" {:>12}", fmt::currency(trader.portfolio_value)),
                row_style.fg(C_BRIGHT),
            ),
            Span::styled(
                format!(" {:>12}", fmt::signed_currency(trader.pnl)),
                row_style.fg(pnl_color),
            ),
            Span::styled(format!(" {:>8}", trader.shares), row_style.fg(C_BRIGHT)),
        ]));
    }

    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "No traders match.",
            Style::default().fg(C_DIM),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Render the detail panel for the selected trader
pub fn render_trader_detail(f: &mut Frame, area: Rect, detail: Option<&TraderDetail>) {
    let block = Block::default()
        .title(" TRADER DETAIL ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let detail = match detail {
        Some(detail) => detail,
        None => {
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "Select a trader to see details.",
                    Style::default().fg(C_DIM),
                ))),
                inner,
            );
            return;
        }
    };

    let pnl_color = if detail.pnl_positive { C_UP } else { C_DOWN };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("TRADER  ", Style::default().fg(C_DIM)),
            Span::styled(
                &detail.id,
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("VALUE   ", Style::default().fg(C_DIM)),
            Span::styled(&detail.portfolio_value, Style::default().fg(C_BRIGHT)),
            Span::styled("  CASH ", Style::default().fg(C_DIM)),
            Span::styled(&detail.cash, Style::default().fg(C_BRIGHT)),
        ]),
        Line::from(vec![
            Span::styled("PNL     ", Style::default().fg(C_DIM)),
            Span::styled(&detail.pnl, Style::default().fg(pnl_color)),
        ]),
        Line::from(vec![
            Span::styled("SHARES  ", Style::default().fg(C_DIM)),
            Span::styled(detail.shares.to_string(), Style::default().fg(C_BRIGHT)),
            Span::styled("  TRADED ", Style::default().fg(C_DIM)),
            Span::styled(
                fmt::quantity(detail.total_volume_traded),
                Style::default().fg(C_BRIGHT),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("OPEN ORDERS", Style::default().fg(C_DIM))),
    ];

    if detail.open_orders.is_empty() {
        lines.push(Line::from(Span::styled(
            "No open orders.",
            Style::default().fg(C_DIM),
        )));
    } else {
        for order in &detail.open_orders {
            let side_color = if order.side.is_buy() { C_UP } else { C_DOWN };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<5}", order.side.as_str()),
                    Style::default().fg(side_color),
                ),
                Span::styled(format!("{:>10}", order.price), Style::default().fg(C_BRIGHT)),
                Span::styled(format!("  x{}", order.quantity), Style::default().fg(C_DIM)),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "RECENT TRADES",
        Style::default().fg(C_DIM),
    )));

    if detail.trade_history.is_empty() {
        lines.push(Line::from(Span::styled(
            "No trade history.",
            Style::default().fg(C_DIM),
        )));
    } else {
        let remaining = (inner.height as usize).saturating_sub(lines.len());
        for row in detail.trade_history.iter().take(remaining) {
            let side_color = if row.side.is_buy() { C_UP } else { C_DOWN };
            lines.push(Line::from(vec![
                Span::styled(row.time.clone(), Style::default().fg(C_DIM)),
                Span::styled(
                    format!(" {:<5}", row.side.as_str()),
                    Style::default().fg(side_color),
                ),
                Span::styled(format!("{:>10}", row.price), Style::default().fg(C_BRIGHT)),
                Span::styled(format!("  x{}", row.quantity), Style::default().fg(C_DIM)),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Render the sampled history chart for the selected trader
///
/// Re-projects from the selection and mode on every draw, so switching
/// either takes effect on the next frame with whatever the trader's series
/// has accumulated.
pub fn render_trader_chart(
    f: &mut Frame,
    area: Rect,
    book: &HistoryBook,
    selected: Option<&TraderId>,
    mode: ChartMode,
) {
    let title = format!(" {} ", mode.label());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 10 || inner.height < 3 {
        // Not enough room for axes; skip the draw and say so once
        if SMALL_CHART_WARNED.set(()).is_ok() {
            warn!(
                "trader chart area {}x{} too small to render",
                inner.width, inner.height
            );
        }
        return;
    }

    let series = selected.and_then(|id| book.series(id));
    let points = series.map(|s| s.points(mode)).unwrap_or_default();

    if points.len() < 2 {
        let message = if selected.is_none() {
            "Select a trader to start sampling."
        } else {
            "Sampling every 2s, waiting for data..."
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(message, Style::default().fg(C_DIM)))),
            inner,
        );
        return;
    }

    let values: Vec<f64> = points.iter().map(|&(_, v)| v).collect();
    let bounds = y_bounds(&values);
    let labels = y_labels(bounds);

    let time_labels: Vec<String> = match series {
        Some(series) => {
            let first = series.labels().next();
            let last = series.labels().last();
            match (first, last) {
                (Some(first), Some(last)) => vec![
                    first.format("%H:%M:%S").to_string(),
                    last.format("%H:%M:%S").to_string(),
                ],
                _ => Vec::new(),
            }
        }
        None => Vec::new(),
    };

    let datasets = vec![Dataset::default()
        .graph_type(GraphType::Line)
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(C_UP))
        .data(&points)];

    let chart_widget = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .bounds(x_bounds(points.len()))
                .labels(time_labels)
                .style(Style::default().fg(C_DIM)),
        )
        .y_axis(
            Axis::default()
                .bounds(bounds)
                .labels(labels)
                .style(Style::default().fg(C_DIM)),
        );
    f.render_widget(chart_widget, inner);
}
