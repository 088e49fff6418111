pub mod category;
pub mod lenient;
pub mod metrics;
pub mod overview;
pub mod page;
pub mod token;

pub use category::{Category, SortKey, Tab, UnknownTab};
pub use metrics::{MarketMetrics, MarketMetricsReport, PlatformStats};
pub use overview::{Movers, NetworkHealth, OverviewState};
pub use page::CollectionPageState;
pub use token::{Conversion, TokenSummary, UpstreamToken};
