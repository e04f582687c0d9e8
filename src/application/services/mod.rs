/// Application services coordinating several outbound ports
mod waterfall_resolver;

pub use waterfall_resolver::{WaterfallResolver, DEFAULT_MAX_CONCURRENCY};
