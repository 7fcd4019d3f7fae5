pub mod aggregator;
pub mod model;
pub mod recorder;

pub use aggregator::AnalyticsAggregator;
pub use model::{AnalyticsSummary, DailyViews, ItemType, TopItem};
pub use recorder::ViewRecorder;

/// 原始浏览事件集合
pub const EVENTS_COLLECTION: &str = "analytics";

/// 聚合汇总集合与单例文档 id
pub const SUMMARY_COLLECTION: &str = "analytics_summary";
pub const SUMMARY_DOC_ID: &str = "summary";
