mod enrichment;

pub use enrichment::{LocalClock, RateConversion};
