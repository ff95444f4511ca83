pub mod fetcher;
pub mod throttle;

pub use fetcher::{Fetcher, HttpFetcher, PageOutcome};
pub use throttle::{FixedDelay, NoDelay, Throttle};
