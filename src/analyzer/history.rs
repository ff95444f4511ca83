use crate::model::HistoryRow;
use std::collections::BTreeMap;

pub const DEFAULT_CHEAPEST: usize = 10;

/// The `n` cheapest rows of the whole history as `(title, price)`.
/// Rows without a usable price are left out. Equal prices keep store order.
pub fn cheapest(rows: &[HistoryRow], n: usize) -> Vec<(String, f64)> {
    let mut priced: Vec<(String, f64)> = rows
        .iter()
        .filter_map(|row| row.price.map(|price| (row.title.clone(), price)))
        .collect();
    priced.sort_by(|a, b| a.1.total_cmp(&b.1));
    priced.truncate(n);
    priced
}

/// Mean price per capture date, oldest date first.
/// ISO dates sort chronologically as plain strings.
pub fn average_by_date(rows: &[HistoryRow]) -> Vec<(String, f64)> {
    let mut by_date: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in rows {
        if let (Some(price), Some(date)) = (row.price, row.date.as_deref()) {
            let entry = by_date.entry(date).or_default();
            entry.0 += price;
            entry.1 += 1;
        }
    }

    by_date
        .into_iter()
        .map(|(date, (sum, count))| (date.to_string(), sum / count as f64))
        .collect()
}
