use crate::model::{BookRecord, PriceStats};

/// Calculates basic statistical metrics over one run's prices:
/// count, average, min, max and population standard deviation.
/// Returns `None` for an empty batch.
pub fn calculate_stats(records: &[BookRecord]) -> Option<PriceStats> {
    let prices: Vec<f64> = records
        .iter()
        .map(|r| r.price)
        .filter(|p| p.is_finite())
        .collect();
    if prices.is_empty() {
        return None;
    }

    let count = prices.len() as f64;
    let avg = prices.iter().sum::<f64>() / count;
    let stddev = (prices.iter().map(|p| (p - avg).powi(2)).sum::<f64>() / count).sqrt();
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(PriceStats {
        count: prices.len(),
        avg_price: avg,
        min_price: min,
        max_price: max,
        std_dev: stddev,
    })
}
