use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 浏览事件的内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// 博客文章
    Blog,
    /// 项目
    Project,
    /// 下载
    Download,
    /// 其他
    Other,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Blog => "blog",
            ItemType::Project => "project",
            ItemType::Download => "download",
            ItemType::Other => "other",
        }
    }
}

/// 排名条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopItem {
    pub id: String,
    pub title: String,
    pub views: u64,
}

/// 聚合汇总（单例文档，整条覆盖写入）
///
/// 不变式：`monthly_views <= total_views`；top 列表按 views 降序，
/// 并列时保持首次出现的次序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_views: u64,
    pub monthly_views: u64,
    pub yearly_views: u64,
    pub top_blogs: Vec<TopItem>,
    pub top_projects: Vec<TopItem>,
    pub last_updated: DateTime<Utc>,
    /// 统计月份，`YYYY-MM`
    pub period_month: String,
    pub period_year: u32,
}

/// 单日浏览数（仪表盘趋势）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyViews {
    /// 日期，`YYYY-MM-DD`
    pub date: String,
    pub views: u64,
}
