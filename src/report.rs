// Text charts for the terminal
use crate::analyzer::{average_by_date, cheapest};
use crate::model::StorageError;
use crate::storage::CsvStore;
use tracing::info;

const TITLE_WIDTH: usize = 36;
const BAR_WIDTH: usize = 40;

/// Horizontal bar chart, cheapest first (top row is the cheapest book).
pub fn render_cheapest(entries: &[(String, f64)]) -> String {
    let mut out = format!("📚 Top {} Cheapest Books\n", entries.len());
    if entries.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let max = entries.iter().map(|(_, p)| *p).fold(0.0_f64, f64::max);
    for (title, price) in entries {
        let bar = scaled(*price, 0.0, max, BAR_WIDTH);
        out.push_str(&format!(
            "  {:<width$} │{} £{:.2}\n",
            fit(title, TITLE_WIDTH),
            "█".repeat(bar),
            price,
            width = TITLE_WIDTH
        ));
    }
    out
}

/// Average price per date as a dot plot between the lowest and highest mean.
pub fn render_average_trend(points: &[(String, f64)]) -> String {
    let mut out = String::from("📈 Average Book Price Over Time\n");
    if points.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let min = points.iter().map(|(_, p)| *p).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|(_, p)| *p).fold(f64::NEG_INFINITY, f64::max);
    for (date, avg) in points {
        let offset = scaled(*avg, min, max, BAR_WIDTH - 1);
        let mut lane = " ".repeat(BAR_WIDTH);
        lane.replace_range(offset..offset + 1, "o");
        out.push_str(&format!("  {} │{}│ £{:.2}\n", date, lane, avg));
    }
    out
}

/// Re-reads the whole store and renders both charts.
pub fn render_history(store: &CsvStore, cheapest_limit: usize) -> Result<String, StorageError> {
    let history = store.load_history()?;
    info!("Loaded {} historical rows", history.len());

    let mut out = render_cheapest(&cheapest(&history, cheapest_limit));
    out.push('\n');
    out.push_str(&render_average_trend(&average_by_date(&history)));
    Ok(out)
}

/// Position of `value` on a `0..=width` scale spanning `low..=high`.
/// A degenerate range puts everything at zero.
fn scaled(value: f64, low: f64, high: f64, width: usize) -> usize {
    if high <= low {
        return if value > low { width } else { 0 };
    }
    let ratio = ((value - low) / (high - low)).clamp(0.0, 1.0);
    (ratio * width as f64).round() as usize
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}
