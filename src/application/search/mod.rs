//! Search and filter engine over projects and blog posts.

mod criteria;
mod predicate;
mod service;

pub use criteria::{
    CriteriaError, DateRange, SearchCriteria, SearchQuery, parse_instant, split_list,
};
pub use predicate::{SearchPredicate, Searchable, TagField, TextField, build_predicate};
pub use service::{
    POPULAR_TERMS, SEARCH_COMMENT_LIMIT, SearchHits, SearchService, Suggestion, SuggestionKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDomain {
    Projects,
    Blogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    Basic,
    Advanced,
}

/// Which domains a single request searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Only(SearchDomain),
    All,
}

impl SearchScope {
    pub fn includes(self, domain: SearchDomain) -> bool {
        match self {
            SearchScope::All => true,
            SearchScope::Only(only) => only == domain,
        }
    }
}
