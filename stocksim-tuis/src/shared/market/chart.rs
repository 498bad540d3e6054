//! Price-chart projection: colored segments, point markers, axis bounds
//!
//! Pure functions from the pushed `price_history` to chart geometry. The
//! widget layer only maps this output onto ratatui datasets.

use crate::shared::classify::{classify, classify_series, Direction};
use crate::shared::fmt;

/// One adjacent-pair line segment of the price chart
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub direction: Direction,
}

/// Build one segment per adjacent pair of the price history
///
/// x is the sample index, y the price. Pairs with a non-finite endpoint are
/// skipped so no segment is ever drawn through coordinates that do not
/// exist. Fewer than two samples produce no segments.
pub fn segments(history: &[f64]) -> Vec<Segment> {
    if history.len() < 2 {
        return Vec::new();
    }

    history
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].is_finite() && pair[1].is_finite())
        .map(|(i, pair)| Segment {
            from: (i as f64, pair[0]),
            to: ((i + 1) as f64, pair[1]),
            direction: classify(pair[0], pair[1]),
        })
        .collect()
}

/// Marker points grouped by direction
#[derive(Debug, Clone, Default)]
pub struct DirectionPoints {
    pub up: Vec<(f64, f64)>,
    pub down: Vec<(f64, f64)>,
    pub neutral: Vec<(f64, f64)>,
}

/// Group each finite sample into an up/down/neutral marker bucket
///
/// Classification matches the segments exactly; index 0 is neutral.
pub fn points_by_direction(history: &[f64]) -> DirectionPoints {
    let directions = classify_series(history);
    let mut points = DirectionPoints::default();
    for (i, (&value, direction)) in history.iter().zip(directions).enumerate() {
        if !value.is_finite() {
            continue;
        }
        let point = (i as f64, value);
        match direction {
            Direction::Up => points.up.push(point),
            Direction::Down => points.down.push(point),
            Direction::Neutral => points.neutral.push(point),
        }
    }
    points
}

/// Y-axis bounds padded 5% beyond the observed range
///
/// A flat series gets an absolute pad so the line never sits on the border.
pub fn y_bounds(values: &[f64]) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values.iter().copied().filter(|v| v.is_finite()) {
        min = min.min(value);
        max = max.max(value);
    }

    if min > max {
        // No finite samples
        return [0.0, 1.0];
    }

    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        (max.abs() * 0.05).max(1.0)
    };
    [min - pad, max + pad]
}

/// Currency labels for the bottom, middle, and top of the y-axis
pub fn y_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    vec![
        fmt::currency(bounds[0]),
        fmt::currency(mid),
        fmt::currency(bounds[1]),
    ]
}

/// X-axis bounds covering every sample index
pub fn x_bounds(len: usize) -> [f64; 2] {
    [0.0, len.saturating_sub(1).max(1) as f64]
}
