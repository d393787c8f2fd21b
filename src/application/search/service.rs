use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::application::repos::{BlogsRepo, ProjectsRepo, RepoError};
use crate::domain::entities::{BlogWithActivity, ProjectRecord};

use super::criteria::SearchCriteria;
use super::predicate::build_predicate;
use super::{SearchDomain, SearchScope, SearchTier};

/// Comments embedded with each blog hit.
pub const SEARCH_COMMENT_LIMIT: usize = 5;
const SUGGESTIONS_PER_DOMAIN: usize = 3;
const MIN_SUGGESTION_CHARS: usize = 2;

pub const POPULAR_TERMS: [&str; 10] = [
    "JavaScript",
    "React",
    "Node.js",
    "TypeScript",
    "Web Development",
    "Frontend",
    "Backend",
    "API",
    "Database",
    "Programming",
];

/// Matching records for one search; only the domains in scope are populated.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub projects: Vec<ProjectRecord>,
    pub blogs: Vec<BlogWithActivity>,
}

impl SearchHits {
    pub fn total(&self) -> usize {
        self.projects.len() + self.blogs.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Project,
    Blog,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub id: Uuid,
}

#[derive(Clone)]
pub struct SearchService {
    projects: Arc<dyn ProjectsRepo>,
    blogs: Arc<dyn BlogsRepo>,
}

impl SearchService {
    pub fn new(projects: Arc<dyn ProjectsRepo>, blogs: Arc<dyn BlogsRepo>) -> Self {
        Self { projects, blogs }
    }

    /// Text match over the domain's text fields, or an exact tag hit.
    pub async fn search_basic(
        &self,
        criteria: &SearchCriteria,
        scope: SearchScope,
    ) -> Result<SearchHits, RepoError> {
        self.run(SearchTier::Basic, criteria, scope).await
    }

    /// Text match ANDed with the tag overlap and, for blogs, the date range.
    pub async fn search_advanced(
        &self,
        criteria: &SearchCriteria,
        scope: SearchScope,
    ) -> Result<SearchHits, RepoError> {
        self.run(SearchTier::Advanced, criteria, scope).await
    }

    /// Up to three project titles followed by up to three blog titles.
    pub async fn suggestions(&self, raw_query: Option<&str>) -> Result<Vec<Suggestion>, RepoError> {
        let Some(query) = raw_query.map(str::trim) else {
            return Ok(Vec::new());
        };
        if query.chars().count() < MIN_SUGGESTION_CHARS {
            return Ok(Vec::new());
        }

        let hits = self
            .search_basic(&SearchCriteria::text(query), SearchScope::All)
            .await?;

        let projects = hits
            .projects
            .into_iter()
            .take(SUGGESTIONS_PER_DOMAIN)
            .map(|project| Suggestion {
                kind: SuggestionKind::Project,
                title: project.title,
                id: project.id,
            });
        let blogs = hits
            .blogs
            .into_iter()
            .take(SUGGESTIONS_PER_DOMAIN)
            .map(|entry| Suggestion {
                kind: SuggestionKind::Blog,
                title: entry.blog.title,
                id: entry.blog.id,
            });

        Ok(projects.chain(blogs).collect())
    }

    pub fn popular_terms(&self) -> &'static [&'static str] {
        &POPULAR_TERMS
    }

    async fn run(
        &self,
        tier: SearchTier,
        criteria: &SearchCriteria,
        scope: SearchScope,
    ) -> Result<SearchHits, RepoError> {
        let mut hits = SearchHits::default();

        if scope.includes(SearchDomain::Projects) {
            let predicate = build_predicate(SearchDomain::Projects, tier, criteria);
            hits.projects = self.projects.search_projects(&predicate).await?;
        }

        if scope.includes(SearchDomain::Blogs) {
            let predicate = build_predicate(SearchDomain::Blogs, tier, criteria);
            hits.blogs = self
                .blogs
                .search_blogs(&predicate, SEARCH_COMMENT_LIMIT)
                .await?;
        }

        tracing::debug!(
            target = "application::search",
            ?tier,
            ?scope,
            projects = hits.projects.len(),
            blogs = hits.blogs.len(),
            "search completed"
        );

        Ok(hits)
    }
}
