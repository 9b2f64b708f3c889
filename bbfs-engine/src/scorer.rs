use serde::{Deserialize, Serialize};

use bbfs_db::models::Draw;
use crate::patterns::{detect, PatternSummary, Trend};

pub const BBFS_SIZE: usize = 8;
pub const MIN_SCORE_HISTORY: usize = 10;
pub const PLACEHOLDER: [u8; BBFS_SIZE] = [1, 2, 3, 4, 5, 6, 7, 8];
pub const INSUFFICIENT_DATA: &str = "insufficient data";

// Points per signal.
const HOT_2D_TENS: i32 = 8;
const HOT_2D_UNITS: i32 = 10;
const SHIO: i32 = 6;
const HEAD: i32 = 5;
const COLD: i32 = 12;
const TREND: i32 = 3;
const PREDICTED_TENS: i32 = 4;
const PREDICTED_UNITS: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Ascending.
    pub digits: [u8; BBFS_SIZE],
    /// Every scored digit, best first.
    pub ranking: Vec<(u8, i32)>,
    pub rationale: Vec<String>,
    pub predicted_tail: Option<u8>,
}

impl Prediction {
    fn placeholder() -> Self {
        Self {
            digits: PLACEHOLDER,
            ranking: Vec::new(),
            rationale: vec![INSUFFICIENT_DATA.to_string()],
            predicted_tail: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.predicted_tail.is_none()
    }

    pub fn contains(&self, digit: u8) -> bool {
        self.digits.contains(&digit)
    }

    pub fn contains_all(&self, digits: &[u8]) -> bool {
        digits.iter().all(|&d| self.contains(d))
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits: Vec<String> = self.digits.iter().map(u8::to_string).collect();
        write!(f, "{}", digits.join(" "))
    }
}

/// Per-digit scores, remembering the order digits were first scored in.
#[derive(Debug, Default)]
struct CandidateSet {
    scores: Vec<(u8, i32)>,
}

impl CandidateSet {
    fn add(&mut self, digit: u8, points: i32) {
        match self.scores.iter_mut().find(|(d, _)| *d == digit) {
            Some((_, score)) => *score += points,
            None => self.scores.push((digit, points)),
        }
    }

    /// Highest first; equal scores keep first-scored order.
    fn ranked(mut self) -> Vec<(u8, i32)> {
        self.scores.sort_by(|a, b| b.1.cmp(&a.1));
        self.scores
    }
}

/// Builds the 8-digit BBFS for the draw following `history` (oldest first).
pub fn score(history: &[Draw]) -> Prediction {
    if history.len() < MIN_SCORE_HISTORY {
        return Prediction::placeholder();
    }
    let (Some(summary), Some(last)) = (detect(history), history.last()) else {
        return Prediction::placeholder();
    };

    let mut candidates = CandidateSet::default();

    for &pair in &summary.top_2d {
        candidates.add(pair / 10, HOT_2D_TENS);
        candidates.add(pair % 10, HOT_2D_UNITS);
    }
    for &shio in &summary.top_shio {
        candidates.add(shio % 10, SHIO);
    }
    for &head in &summary.top_head {
        candidates.add(head, HEAD);
    }
    for &cold in &summary.cold_digits {
        candidates.add(cold, COLD);
    }
    let parity = match summary.trend {
        Trend::Even => 0,
        Trend::Odd => 1,
    };
    for digit in (parity..10).step_by(2) {
        candidates.add(digit, TREND);
    }

    let tail = predicted_tail(last.tail(), summary.avg_tail_delta);
    candidates.add(tail / 10, PREDICTED_TENS);
    candidates.add(tail % 10, PREDICTED_UNITS);

    let ranking = candidates.ranked();
    let digits = select(&ranking);
    log::debug!("BBFS {:?} from {} results", digits, history.len());

    Prediction {
        digits,
        rationale: rationale(&summary, tail),
        ranking,
        predicted_tail: Some(tail),
    }
}

/// `round(last + delta) mod 100`, rounding half to even.
pub fn predicted_tail(last_tail: u8, avg_delta: f64) -> u8 {
    let rounded = (last_tail as f64 + avg_delta).round_ties_even() as i64;
    rounded.rem_euclid(100) as u8
}

/// Top [`BBFS_SIZE`] of `ranking`, padded with the lowest unused digits, ascending.
fn select(ranking: &[(u8, i32)]) -> [u8; BBFS_SIZE] {
    let mut chosen: Vec<u8> = ranking.iter().take(BBFS_SIZE).map(|&(d, _)| d).collect();
    for digit in 0..10u8 {
        if chosen.len() == BBFS_SIZE {
            break;
        }
        if !chosen.contains(&digit) {
            chosen.push(digit);
        }
    }
    chosen.sort_unstable();

    let mut digits = [0u8; BBFS_SIZE];
    digits.copy_from_slice(&chosen);
    digits
}

fn rationale(summary: &PatternSummary, tail: u8) -> Vec<String> {
    vec![
        format!("Hot 2D: {} pairs", summary.top_2d.len()),
        format!("Shio: {:?}", summary.top_shio),
        format!("Head: {:?}", summary.top_head),
        format!("Cold: {:?}", summary.cold_digits),
        format!("Trend: {}, Δ={}", summary.trend, summary.avg_tail_delta),
        format!("Predicted tail: {:02}", tail),
    ]
}
