use crate::model::{AnalyticsSummary, DailyViews, TopItem};
use crate::{EVENTS_COLLECTION, SUMMARY_COLLECTION, SUMMARY_DOC_ID};
use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use folio_core::{parse_naive, Clock};
use folio_store::{DocumentStore, Filter};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// 排名个数上限
const TOP_N: usize = 5;

/// 分析聚合器
///
/// 扫描原始浏览事件，计算总量/月度/年度计数和 top 内容排名，
/// 整条覆盖写入单例汇总文档，并带 5 分钟新鲜度的缓存读取
pub struct AnalyticsAggregator {
    /// 文档存储
    store: Arc<dyn DocumentStore>,

    /// 注入的时钟
    clock: Arc<dyn Clock>,

    /// 缓存新鲜度阈值
    freshness_ttl: Duration,

    /// single-flight 锁：过期窗口内的并发读取只触发一次重算
    refresh_gate: Mutex<()>,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            freshness_ttl: Duration::minutes(5),
            refresh_gate: Mutex::new(()),
        }
    }

    /// 自定义新鲜度阈值（秒）
    pub fn with_freshness_ttl_secs(mut self, secs: i64) -> Self {
        self.freshness_ttl = Duration::seconds(secs);
        self
    }

    /// 强制重算聚合汇总
    ///
    /// 任何扫描/写入失败都不向外传播，返回 `None` 表示 "聚合不可用"，
    /// 调用方需要自行降级
    pub async fn aggregate(&self) -> Option<AnalyticsSummary> {
        match self.compute_and_store().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!("Analytics aggregation failed: {:#}", e);
                None
            }
        }
    }

    /// 读取聚合汇总
    ///
    /// 缓存未过期时直接返回；缺失或过期则同步重算后返回
    pub async fn get_summary(&self) -> Option<AnalyticsSummary> {
        match self.load_fresh().await {
            Ok(Some(summary)) => Some(summary),
            Ok(None) => self.refresh().await,
            Err(e) => {
                error!("Failed to read analytics summary: {:#}", e);
                self.refresh().await
            }
        }
    }

    /// 最近 N 天的每日浏览数，按日期升序
    ///
    /// 用单字段范围过滤圈出窗口，再在内存中按天分桶，
    /// 避免对存储要求复合索引
    pub async fn daily_views(&self, days: u32) -> Result<Vec<DailyViews>> {
        let today = self.clock.now().naive_utc().date();
        let first_day = today - Duration::days(i64::from(days.saturating_sub(1)));
        let window_start = format!("{}T00:00:00Z", first_day.format("%Y-%m-%d"));

        let events = self
            .store
            .scan(
                EVENTS_COLLECTION,
                Some(&Filter::ge("timestamp", window_start)),
            )
            .await
            .context("scanning view events for daily counts")?;

        let mut counts: HashMap<NaiveDate, u64> = HashMap::new();
        for doc in &events {
            if let Some(ts) = doc.get("timestamp").and_then(parse_naive) {
                if ts.date() <= today {
                    *counts.entry(ts.date()).or_default() += 1;
                }
            }
        }

        Ok((0..days)
            .map(|offset| {
                let date = first_day + Duration::days(i64::from(offset));
                DailyViews {
                    date: date.format("%Y-%m-%d").to_string(),
                    views: counts.get(&date).copied().unwrap_or(0),
                }
            })
            .collect())
    }

    /// 过期时重算；single-flight 锁内再次检查新鲜度，
    /// 并发调用只有第一个真正扫描
    async fn refresh(&self) -> Option<AnalyticsSummary> {
        let _guard = self.refresh_gate.lock().await;
        if let Ok(Some(summary)) = self.load_fresh().await {
            return Some(summary);
        }
        self.aggregate().await
    }

    /// 读取未过期的汇总；缺失或过期返回 `Ok(None)`
    async fn load_fresh(&self) -> Result<Option<AnalyticsSummary>> {
        let doc = self.store.get(SUMMARY_COLLECTION, SUMMARY_DOC_ID).await?;
        let Some(doc) = doc else {
            return Ok(None);
        };

        let Some(last_updated) = doc.get("last_updated").and_then(parse_naive) else {
            return Ok(None);
        };

        let age = self.clock.now().naive_utc() - last_updated;
        if age < self.freshness_ttl {
            let summary = doc
                .deserialize::<AnalyticsSummary>()
                .context("deserializing cached summary")?;
            return Ok(Some(summary));
        }

        Ok(None)
    }

    async fn compute_and_store(&self) -> Result<AnalyticsSummary> {
        let events = self
            .store
            .scan(EVENTS_COLLECTION, None)
            .await
            .context("scanning view events")?;

        let now = self.clock.now();
        let now_naive = now.naive_utc();
        let month_start = month_start(now_naive);
        let year_start = year_start(now_naive);

        let total_views = events.len() as u64;
        let mut monthly_views: u64 = 0;
        let mut yearly_views: u64 = 0;
        let mut blogs = TopAccumulator::new();
        let mut projects = TopAccumulator::new();

        for doc in &events {
            // 解析失败的时间戳只计入总量，不参与月度/年度计数
            if let Some(ts) = doc.get("timestamp").and_then(parse_naive) {
                if ts >= month_start {
                    monthly_views += 1;
                }
                if ts >= year_start {
                    yearly_views += 1;
                }
            }

            // 缺失 item_id 的事件不参与排名
            let item_id = doc.get_str("item_id").filter(|id| !id.is_empty());
            let title = doc.get_str("title").unwrap_or("Unknown");
            match (doc.get_str("item_type"), item_id) {
                (Some("blog"), Some(id)) => blogs.record(id, title),
                (Some("project"), Some(id)) => projects.record(id, title),
                _ => {}
            }
        }

        let summary = AnalyticsSummary {
            total_views,
            monthly_views,
            yearly_views,
            top_blogs: blogs.top(TOP_N),
            top_projects: projects.top(TOP_N),
            last_updated: now,
            period_month: month_start.format("%Y-%m").to_string(),
            period_year: now_naive.year() as u32,
        };

        let Value::Object(fields) = serde_json::to_value(&summary)? else {
            anyhow::bail!("summary did not serialize to an object");
        };
        self.store
            .set(SUMMARY_COLLECTION, SUMMARY_DOC_ID, fields)
            .await
            .context("persisting analytics summary")?;

        info!(
            total_views = summary.total_views,
            monthly_views = summary.monthly_views,
            yearly_views = summary.yearly_views,
            "Analytics summary updated"
        );

        Ok(summary)
    }
}

/// 当月第一个瞬间
fn month_start(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .unwrap_or_else(|| now.date())
        .and_hms_opt(0, 0, 0)
        .unwrap_or(now)
}

/// 当年第一个瞬间
fn year_start(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .unwrap_or_else(|| now.date())
        .and_hms_opt(0, 0, 0)
        .unwrap_or(now)
}

/// 按 item_id 累计浏览数，保留最近一次出现的标题
///
/// 条目按首次出现的次序保存，配合稳定排序实现并列时的确定次序
struct TopAccumulator {
    order: Vec<TopItem>,
    index: HashMap<String, usize>,
}

impl TopAccumulator {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn record(&mut self, id: &str, title: &str) {
        match self.index.get(id) {
            Some(&i) => {
                let item = &mut self.order[i];
                item.views += 1;
                item.title = title.to_string();
            }
            None => {
                self.index.insert(id.to_string(), self.order.len());
                self.order.push(TopItem {
                    id: id.to_string(),
                    title: title.to_string(),
                    views: 1,
                });
            }
        }
    }

    fn top(&self, n: usize) -> Vec<TopItem> {
        let mut items = self.order.clone();
        // sort_by 是稳定排序，views 相同的条目保持首次出现次序
        items.sort_by(|a, b| b.views.cmp(&a.views));
        items.truncate(n);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use folio_core::ManualClock;
    use folio_store::{Fields, MemoryStore};
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().unwrap().clone()
    }

    fn setup(now: chrono::DateTime<Utc>) -> (Arc<MemoryStore>, Arc<ManualClock>, AnalyticsAggregator) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(now));
        let aggregator = AnalyticsAggregator::new(store.clone(), clock.clone());
        (store, clock, aggregator)
    }

    async fn add_event(store: &MemoryStore, timestamp: &str, item_type: &str, item_id: &str) {
        store
            .insert(
                EVENTS_COLLECTION,
                fields(json!({
                    "timestamp": timestamp,
                    "item_type": item_type,
                    "item_id": item_id,
                    "title": format!("Title of {}", item_id),
                })),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_counts_monthly_and_yearly() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        add_event(&store, "2026-03-10T08:00:00Z", "blog", "a").await; // 本月
        add_event(&store, "2026-01-05T08:00:00Z", "blog", "a").await; // 本年非本月
        add_event(&store, "2025-12-31T23:59:59Z", "blog", "a").await; // 去年
        add_event(&store, "2026-03-01T00:00:00Z", "blog", "a").await; // 月初边界，计入

        let summary = aggregator.aggregate().await.unwrap();
        assert_eq!(summary.total_views, 4);
        assert_eq!(summary.monthly_views, 2);
        assert_eq!(summary.yearly_views, 3);
        assert_eq!(summary.period_month, "2026-03");
        assert_eq!(summary.period_year, 2026);
    }

    #[tokio::test]
    async fn test_malformed_timestamp_counts_total_only() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        add_event(&store, "2026-03-10T08:00:00Z", "blog", "a").await;
        add_event(&store, "not-a-timestamp", "blog", "a").await;

        let summary = aggregator.aggregate().await.unwrap();
        assert_eq!(summary.total_views, 2);
        assert_eq!(summary.monthly_views, 1);
        assert_eq!(summary.yearly_views, 1);
    }

    #[tokio::test]
    async fn test_top_ranking_stable_ties_and_truncation() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        // 首次出现次序 A, B, C, D, E, F；计数 A:10 B:10 C:5 D:20 E:1 F:7
        let counts = [("A", 10), ("B", 10), ("C", 5), ("D", 20), ("E", 1), ("F", 7)];
        for (id, _) in &counts {
            add_event(&store, "2026-03-10T08:00:00Z", "blog", id).await;
        }
        for (id, count) in &counts {
            for _ in 1..*count {
                add_event(&store, "2026-03-10T08:00:00Z", "blog", id).await;
            }
        }

        let summary = aggregator.aggregate().await.unwrap();
        let ranked: Vec<(&str, u64)> = summary
            .top_blogs
            .iter()
            .map(|item| (item.id.as_str(), item.views))
            .collect();
        // 并列的 A/B 保持首次出现次序，E 被截断
        assert_eq!(
            ranked,
            [("D", 20), ("A", 10), ("B", 10), ("F", 7), ("C", 5)]
        );
    }

    #[tokio::test]
    async fn test_missing_item_id_excluded_from_ranking() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        store
            .insert(
                EVENTS_COLLECTION,
                fields(json!({
                    "timestamp": "2026-03-10T08:00:00Z",
                    "item_type": "blog",
                    "title": "No id",
                })),
            )
            .await
            .unwrap();
        add_event(&store, "2026-03-10T08:00:00Z", "project", "p1").await;

        let summary = aggregator.aggregate().await.unwrap();
        assert!(summary.top_blogs.is_empty());
        assert_eq!(summary.top_projects.len(), 1);
        assert_eq!(summary.total_views, 2);
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        add_event(&store, "2026-03-10T08:00:00Z", "blog", "a").await;
        add_event(&store, "2026-02-10T08:00:00Z", "project", "p").await;

        let first = aggregator.aggregate().await.unwrap();
        let second = aggregator.aggregate().await.unwrap();

        assert_eq!(first.total_views, second.total_views);
        assert_eq!(first.monthly_views, second.monthly_views);
        assert_eq!(first.yearly_views, second.yearly_views);
        assert_eq!(first.top_blogs, second.top_blogs);
        assert_eq!(first.top_projects, second.top_projects);
    }

    #[tokio::test]
    async fn test_total_views_monotonic_as_events_grow() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        add_event(&store, "2026-03-10T08:00:00Z", "blog", "a").await;
        let before = aggregator.aggregate().await.unwrap();

        add_event(&store, "2026-03-11T08:00:00Z", "blog", "b").await;
        let after = aggregator.aggregate().await.unwrap();

        assert!(after.total_views >= before.total_views);
    }

    #[tokio::test]
    async fn test_summary_served_within_freshness_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, clock, aggregator) = setup(now);

        add_event(&store, "2026-03-10T08:00:00Z", "blog", "a").await;
        aggregator.aggregate().await.unwrap();

        // 新事件写入后 4m59s 读取：缓存仍新鲜，看不到新事件
        add_event(&store, "2026-03-15T12:01:00Z", "blog", "b").await;
        clock.advance(chrono::Duration::seconds(4 * 60 + 59));
        let cached = aggregator.get_summary().await.unwrap();
        assert_eq!(cached.total_views, 1);

        // 5m01s 后读取：缓存过期，重算后看到新事件
        clock.advance(chrono::Duration::seconds(2));
        let recomputed = aggregator.get_summary().await.unwrap();
        assert_eq!(recomputed.total_views, 2);
    }

    #[tokio::test]
    async fn test_get_summary_computes_when_missing() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        add_event(&store, "2026-03-10T08:00:00Z", "blog", "a").await;

        // 没有持久化过的汇总，首次读取触发聚合
        let summary = aggregator.get_summary().await.unwrap();
        assert_eq!(summary.total_views, 1);
        assert!(store
            .get(SUMMARY_COLLECTION, SUMMARY_DOC_ID)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_summary_overwritten_in_place() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        add_event(&store, "2026-03-10T08:00:00Z", "blog", "a").await;
        aggregator.aggregate().await.unwrap();
        add_event(&store, "2026-03-10T09:00:00Z", "blog", "a").await;
        aggregator.aggregate().await.unwrap();

        // 单例文档，聚合两次也只有一条
        let docs = store.scan(SUMMARY_COLLECTION, None).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get("total_views"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_daily_views_buckets_trailing_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let (store, _clock, aggregator) = setup(now);

        add_event(&store, "2026-03-15T08:00:00Z", "blog", "a").await;
        add_event(&store, "2026-03-15T09:00:00Z", "blog", "a").await;
        add_event(&store, "2026-03-14T08:00:00Z", "project", "p").await;
        add_event(&store, "2026-03-01T08:00:00Z", "blog", "a").await; // 窗口外

        let daily = aggregator.daily_views(3).await.unwrap();
        assert_eq!(
            daily,
            vec![
                DailyViews { date: "2026-03-13".into(), views: 0 },
                DailyViews { date: "2026-03-14".into(), views: 1 },
                DailyViews { date: "2026-03-15".into(), views: 2 },
            ]
        );
    }
}
