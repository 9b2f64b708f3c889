use serde::{Deserialize, Serialize};

use bbfs_db::models::Draw;
use crate::scorer::{score, BBFS_SIZE};

pub const MIN_BACKTEST_HISTORY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BacktestMode {
    /// Both tail digits must be in the BBFS.
    #[serde(rename = "2d")]
    TwoD,
    /// Hundreds, tens and units must be in the BBFS.
    #[serde(rename = "3d")]
    ThreeD,
}

impl BacktestMode {
    pub fn checked_digits(self, draw: &Draw) -> &[u8] {
        match self {
            BacktestMode::TwoD => draw.tail_digits(),
            BacktestMode::ThreeD => draw.last_three(),
        }
    }

    pub fn grade(self, accuracy: f64) -> Grade {
        let (good, fair) = match self {
            BacktestMode::TwoD => (90.0, 70.0),
            BacktestMode::ThreeD => (85.0, 60.0),
        };
        if accuracy >= good {
            Grade::Good
        } else if accuracy >= fair {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }
}

impl std::str::FromStr for BacktestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "2d" | "2" => Ok(BacktestMode::TwoD),
            "3d" | "3" => Ok(BacktestMode::ThreeD),
            other => Err(format!("Unknown backtest mode '{other}' (expected 2d or 3d)")),
        }
    }
}

impl std::fmt::Display for BacktestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BacktestMode::TwoD => write!(f, "2D"),
            BacktestMode::ThreeD => write!(f, "3D"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestStep {
    pub previous: Draw,
    pub actual: Draw,
    pub checked: Vec<u8>,
    pub bbfs: [u8; BBFS_SIZE],
    pub hit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub mode: BacktestMode,
    pub hits: usize,
    pub total: usize,
    pub accuracy: f64,
    pub steps: Vec<BacktestStep>,
}

impl BacktestReport {
    pub fn grade(&self) -> Grade {
        self.mode.grade(self.accuracy)
    }

    /// Running hit rate (%) after each step.
    pub fn cumulative_accuracy(&self) -> Vec<f64> {
        let mut hits = 0usize;
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                if step.hit {
                    hits += 1;
                }
                hits as f64 / (i + 1) as f64 * 100.0
            })
            .collect()
    }
}

pub fn save_report(report: &BacktestReport, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_report(path: &std::path::Path) -> anyhow::Result<BacktestReport> {
    let json = std::fs::read_to_string(path)?;
    let report: BacktestReport = serde_json::from_str(&json)?;
    Ok(report)
}

/// Replays `history` (oldest first): each result is predicted from all the
/// results before it. `None` with fewer than two results.
pub fn backtest(history: &[Draw], mode: BacktestMode) -> Option<BacktestReport> {
    backtest_with(history, mode, |_| {})
}

/// Same as [`backtest`], calling `on_step` after every step.
pub fn backtest_with(
    history: &[Draw],
    mode: BacktestMode,
    mut on_step: impl FnMut(&BacktestStep),
) -> Option<BacktestReport> {
    if history.len() < MIN_BACKTEST_HISTORY {
        return None;
    }

    let total = history.len() - 1;
    let mut steps = Vec::with_capacity(total);
    let mut hits = 0usize;

    // the prefix never reaches the draw being checked
    for i in 0..total {
        let prefix = &history[..=i];
        let actual = history[i + 1];
        let prediction = score(prefix);
        let checked = mode.checked_digits(&actual).to_vec();
        let hit = prediction.contains_all(&checked);
        if hit {
            hits += 1;
        }

        let step = BacktestStep {
            previous: history[i],
            actual,
            checked,
            bbfs: prediction.digits,
            hit,
        };
        log::debug!("{} {} -> {} hit={}", mode, step.previous, step.actual, hit);
        on_step(&step);
        steps.push(step);
    }

    Some(BacktestReport {
        mode,
        hits,
        total,
        accuracy: hits as f64 / total as f64 * 100.0,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{draws, make_test_history};

    #[test]
    fn test_backtest_insufficient() {
        assert!(backtest(&[], BacktestMode::TwoD).is_none());
        assert!(backtest(&draws(&["1234"]), BacktestMode::ThreeD).is_none());
    }

    #[test]
    fn test_two_results_2d_miss() {
        let report = backtest(&draws(&["1000", "2000"]), BacktestMode::TwoD).unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.hits, 0);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(format!("{:.1}", report.accuracy), "0.0");
        let step = &report.steps[0];
        assert_eq!(step.previous.to_string(), "1000");
        assert_eq!(step.actual.to_string(), "2000");
        assert_eq!(step.checked, vec![0, 0]);
        assert_eq!(step.bbfs, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(!step.hit);
    }

    #[test]
    fn test_two_results_3d_hit() {
        let report = backtest(&draws(&["1000", "9123"]), BacktestMode::ThreeD).unwrap();
        assert_eq!(report.hits, 1);
        assert_eq!(report.accuracy, 100.0);
        assert_eq!(report.steps[0].checked, vec![1, 2, 3]);
    }

    #[test]
    fn test_repeated_digits_checked_by_membership() {
        let report = backtest(&draws(&["0000", "0777"]), BacktestMode::ThreeD).unwrap();
        assert!(report.steps[0].hit);
    }

    #[test]
    fn test_steps_use_prefix_only() {
        let history = make_test_history(25);
        let report = backtest(&history, BacktestMode::TwoD).unwrap();
        assert_eq!(report.total, 24);
        assert_eq!(report.steps.len(), 24);
        for (i, step) in report.steps.iter().enumerate() {
            assert_eq!(step.previous, history[i]);
            assert_eq!(step.actual, history[i + 1]);
            assert_eq!(step.bbfs, score(&history[..=i]).digits);
        }
    }

    #[test]
    fn test_accuracy_bounds() {
        for n in [2, 5, 11, 30] {
            for mode in [BacktestMode::TwoD, BacktestMode::ThreeD] {
                let report = backtest(&make_test_history(n), mode).unwrap();
                assert!(report.hits <= report.total);
                assert!((0.0..=100.0).contains(&report.accuracy));
                assert_eq!(report.hits, report.steps.iter().filter(|s| s.hit).count());
            }
        }
    }

    #[test]
    fn test_3d_hits_imply_2d_hits() {
        let history = make_test_history(40);
        let two = backtest(&history, BacktestMode::TwoD).unwrap();
        let three = backtest(&history, BacktestMode::ThreeD).unwrap();
        for (a, b) in two.steps.iter().zip(&three.steps) {
            assert!(!b.hit || a.hit);
        }
    }

    #[test]
    fn test_on_step_called_per_step() {
        let mut seen = 0;
        let report = backtest_with(&make_test_history(12), BacktestMode::TwoD, |_| seen += 1).unwrap();
        assert_eq!(seen, report.total);
    }

    #[test]
    fn test_cumulative_accuracy() {
        let report = backtest(&draws(&["1000", "9123", "5000"]), BacktestMode::ThreeD).unwrap();
        // 9123 hits the placeholder, 5000 does not
        assert_eq!(report.cumulative_accuracy(), vec![100.0, 50.0]);
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(BacktestMode::TwoD.grade(90.0), Grade::Good);
        assert_eq!(BacktestMode::TwoD.grade(89.9), Grade::Fair);
        assert_eq!(BacktestMode::TwoD.grade(69.9), Grade::Poor);
        assert_eq!(BacktestMode::ThreeD.grade(85.0), Grade::Good);
        assert_eq!(BacktestMode::ThreeD.grade(60.0), Grade::Fair);
        assert_eq!(BacktestMode::ThreeD.grade(59.9), Grade::Poor);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("2d".parse::<BacktestMode>().unwrap(), BacktestMode::TwoD);
        assert_eq!("3D".parse::<BacktestMode>().unwrap(), BacktestMode::ThreeD);
        assert!("4d".parse::<BacktestMode>().is_err());
    }

    #[test]
    fn test_save_and_load_report() {
        let report = backtest(&make_test_history(15), BacktestMode::TwoD).unwrap();
        let mut path = std::env::temp_dir();
        path.push(format!("bbfs-report-{}.json", std::process::id()));
        save_report(&report, &path).unwrap();
        let loaded = load_report(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.mode, BacktestMode::TwoD);
        assert_eq!(loaded.total, 14);
        assert_eq!(loaded.steps, report.steps);
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = backtest(&make_test_history(12), BacktestMode::ThreeD).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"mode\":\"3d\""));
        let loaded: BacktestReport = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.steps, report.steps);
        assert_eq!(loaded.hits, report.hits);
        assert!((loaded.accuracy - report.accuracy).abs() < 1e-9);
    }
}
