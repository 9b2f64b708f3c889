pub mod backtest;
pub mod patterns;
pub mod scorer;

use bbfs_db::models::Draw;

/// Deterministic, varied history of `n` results, oldest first.
pub fn make_test_history(n: usize) -> Vec<Draw> {
    (0..n)
        .filter_map(|i| {
            let value = (i * 3797 + 1234) % 10_000;
            Draw::from_digits([
                (value / 1000) as u8,
                (value / 100 % 10) as u8,
                (value / 10 % 10) as u8,
                (value % 10) as u8,
            ])
            .ok()
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn draws(values: &[&str]) -> Vec<Draw> {
    values.iter().map(|v| v.parse().unwrap()).collect()
}
