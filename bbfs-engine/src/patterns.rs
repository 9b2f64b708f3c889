use serde::{Deserialize, Serialize};

use bbfs_db::models::Draw;

pub const MIN_DETECT_HISTORY: usize = 5;
pub const TOP_2D: usize = 15;
pub const TOP_SHIO: usize = 3;
pub const TOP_HEAD: usize = 3;
pub const SHIO_CYCLE: u8 = 12;
/// A digit seen fewer times than this across the window is "cold".
pub const COLD_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Even,
    Odd,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Even => write!(f, "even"),
            Trend::Odd => write!(f, "odd"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    /// Tail values (0-99), hottest first.
    pub top_2d: Vec<u8>,
    /// `tail % 12` values, hottest first.
    pub top_shio: Vec<u8>,
    pub top_head: Vec<u8>,
    /// Ordered by first appearance in the history.
    pub cold_digits: Vec<u8>,
    pub trend: Trend,
    pub avg_tail_delta: f64,
}

/// Derives the six signals over the whole of `history` (oldest first).
/// Returns `None` when there are fewer than [`MIN_DETECT_HISTORY`] results.
pub fn detect(history: &[Draw]) -> Option<PatternSummary> {
    if history.len() < MIN_DETECT_HISTORY {
        return None;
    }

    let tails: Vec<u8> = history.iter().map(Draw::tail).collect();
    let digits: Vec<u8> = history.iter().flat_map(|d| d.digits().iter().copied()).collect();

    let top_2d = most_common(tails.iter().copied(), TOP_2D);
    let top_shio = most_common(tails.iter().map(|t| t % SHIO_CYCLE), TOP_SHIO);
    let top_head = most_common(history.iter().map(Draw::head), TOP_HEAD);

    let cold_digits = counts_in_order(digits.iter().copied())
        .into_iter()
        .filter(|&(_, count)| count < COLD_THRESHOLD)
        .map(|(digit, _)| digit)
        .collect();

    let even = digits.iter().filter(|&&d| d % 2 == 0).count();
    let odd = digits.len() - even;
    let trend = if even > odd { Trend::Even } else { Trend::Odd };

    Some(PatternSummary {
        top_2d,
        top_shio,
        top_head,
        cold_digits,
        trend,
        avg_tail_delta: average_delta(&tails),
    })
}

/// Occurrence counts keyed in first-seen order.
pub fn counts_in_order<T: Copy + PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(value, _)| *value == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts
}

/// The `n` most frequent values. Equal counts keep first-seen order.
pub fn most_common<T: Copy + PartialEq>(items: impl IntoIterator<Item = T>, n: usize) -> Vec<T> {
    let mut counts = counts_in_order(items);
    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(n).map(|(value, _)| value).collect()
}

/// Mean of consecutive signed tail differences, rounded to one decimal.
fn average_delta(tails: &[u8]) -> f64 {
    if tails.len() < 2 {
        return 0.0;
    }
    let sum: i64 = tails
        .windows(2)
        .map(|w| w[1] as i64 - w[0] as i64)
        .sum();
    round_one_decimal(sum as f64 / (tails.len() - 1) as f64)
}

/// Correctly rounded from the binary value, ties to even.
pub fn round_one_decimal(x: f64) -> f64 {
    let rounded: f64 = format!("{x:.1}").parse().unwrap_or(x);
    // keep "-0.0" out of rationale lines
    if rounded == 0.0 { 0.0 } else { rounded }
}
