//! Read models for the admin dashboard.

use std::sync::Arc;

use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::application::repos::{
    ActivityCounts, BlogCommentCount, CategoryCount, CommentWithBlog, ContentCounts,
    DashboardRepo, MessagesRepo, RepoError, TagCount,
};
use crate::domain::entities::MessageRecord;

const RECENT_LIMIT: usize = 5;
const ANALYTICS_LIMIT: usize = 10;
const ACTIVITY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub counts: ContentCounts,
    pub recent_messages: Vec<MessageRecord>,
    pub recent_comments: Vec<CommentWithBlog>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub skills_by_category: Vec<CategoryCount>,
    pub recent_activity: ActivityCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsView {
    pub blogs_with_comments: Vec<BlogCommentCount>,
    pub popular_tags: Vec<TagCount>,
}

#[derive(Clone)]
pub struct AdminService {
    dashboard: Arc<dyn DashboardRepo>,
    messages: Arc<dyn MessagesRepo>,
}

impl AdminService {
    pub fn new(dashboard: Arc<dyn DashboardRepo>, messages: Arc<dyn MessagesRepo>) -> Self {
        Self {
            dashboard,
            messages,
        }
    }

    pub async fn dashboard(&self) -> Result<DashboardView, RepoError> {
        let counts = self.dashboard.content_counts().await?;
        let recent_messages = self.messages.list_messages(Some(RECENT_LIMIT)).await?;
        let recent_comments = self.dashboard.recent_comments(RECENT_LIMIT).await?;

        Ok(DashboardView {
            counts,
            recent_messages,
            recent_comments,
        })
    }

    pub async fn stats(&self) -> Result<StatsView, RepoError> {
        let since = OffsetDateTime::now_utc() - Duration::days(ACTIVITY_WINDOW_DAYS);
        Ok(StatsView {
            skills_by_category: self.dashboard.skill_counts_by_category().await?,
            recent_activity: self.dashboard.activity_since(since).await?,
        })
    }

    pub async fn analytics(&self) -> Result<AnalyticsView, RepoError> {
        let blogs_with_comments = self
            .dashboard
            .blogs_with_comment_counts(ANALYTICS_LIMIT)
            .await?;
        let popular_tags = rank_tags(self.dashboard.tag_usage().await?, ANALYTICS_LIMIT);

        Ok(AnalyticsView {
            blogs_with_comments,
            popular_tags,
        })
    }
}

/// Most used first; ties break alphabetically so the output is stable.
fn rank_tags(mut tags: Vec<TagCount>, limit: usize) -> Vec<TagCount> {
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags.truncate(limit);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(tag: &str, count: u64) -> TagCount {
        TagCount {
            tag: tag.to_string(),
            count,
        }
    }

    #[test]
    fn tags_rank_by_count_then_name() {
        let ranked = rank_tags(
            vec![tag("b", 2), tag("a", 2), tag("c", 5), tag("d", 1)],
            3,
        );
        let names: Vec<_> = ranked.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
