//! Price movement classification
//!
//! Single source of truth for up/down coloring: chart segments, point
//! markers, and change readouts all go through [`classify`].

use std::cmp::Ordering;

/// Direction of a price move between two samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Neutral => "Neutral",
        }
    }

    /// Arrow glyph for compact readouts
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Neutral => "·",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify the move from `prev` to `curr`
///
/// Flat moves classify Up. NaN on either side classifies Neutral rather
/// than panicking.
pub fn classify(prev: f64, curr: f64) -> Direction {
    match curr.partial_cmp(&prev) {
        Some(Ordering::Greater) | Some(Ordering::Equal) => Direction::Up,
        Some(Ordering::Less) => Direction::Down,
        None => Direction::Neutral,
    }
}

/// Classify every sample of a series against its predecessor
///
/// Index 0 has no predecessor and is Neutral.
pub fn classify_series(values: &[f64]) -> Vec<Direction> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if i == 0 {
                Direction::Neutral
            } else {
                classify(values[i - 1], value)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_directions() {
        struct TestCase {
            prev: f64,
            curr: f64,
            expected: Direction,
        }

        let tests = vec![
            TestCase {
                // TC0: rising move
                prev: 100.0,
                curr: 101.0,
                expected: Direction::Up,
            },
            TestCase {
                // TC1: falling move
                prev: 101.0,
                curr: 99.0,
                expected: Direction::Down,
            },
            TestCase {
                // TC2: exact tie counts as up
                prev: 100.0,
                curr: 100.0,
                expected: Direction::Up,
            },
            TestCase {
                // TC3: NaN current
                prev: 100.0,
                curr: f64::NAN,
                expected: Direction::Neutral,
            },
            TestCase {
                // TC4: NaN previous
                prev: f64::NAN,
                curr: 100.0,
                expected: Direction::Neutral,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = classify(test.prev, test.curr);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_classify_series_first_is_neutral() {
        let directions = classify_series(&[100.0, 101.0, 99.0]);
        assert_eq!(
            directions,
            vec![Direction::Neutral, Direction::Up, Direction::Down]
        );
    }

    #[test]
    fn test_classify_series_empty_and_single() {
        assert!(classify_series(&[]).is_empty());
        assert_eq!(classify_series(&[42.0]), vec![Direction::Neutral]);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Up.to_string(), "Up");
        assert_eq!(Direction::Up.arrow(), "▲");
        assert_eq!(Direction::Down.arrow(), "▼");
    }
}
