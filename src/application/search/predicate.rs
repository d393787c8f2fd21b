//! Store-agnostic description of a search filter.
//!
//! The Postgres adapter compiles a [`SearchPredicate`] into SQL; the in-memory
//! adapter evaluates it row by row with [`SearchPredicate::matches`]. Both must
//! agree, so every rule lives here once.

use time::OffsetDateTime;

use crate::domain::entities::{BlogRecord, ProjectRecord};

use super::criteria::{DateRange, SearchCriteria};
use super::{SearchDomain, SearchTier};

/// Free-text column searched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
    Content,
}

impl TextField {
    pub fn column(self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Description => "description",
            TextField::Content => "content",
        }
    }
}

/// Text-array column holding a record's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    TechStack,
    Tags,
}

impl TagField {
    pub fn column(self) -> &'static str {
        match self {
            TagField::TechStack => "tech_stack",
            TagField::Tags => "tags",
        }
    }
}

/// A record is selected when:
///
/// * the needle occurs (case-insensitively) in any of `text_fields`, or the
///   tag array contains `tag_contains` exactly; **and**
/// * `tag_overlap` is empty or shares at least one element with the tag array; **and**
/// * `posted` is unbounded or contains the record's posting date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPredicate {
    pub needle: String,
    pub text_fields: &'static [TextField],
    pub tag_field: TagField,
    pub tag_contains: Option<String>,
    pub tag_overlap: Vec<String>,
    pub posted: DateRange,
}

/// Read access a record must expose to be filtered in memory.
pub trait Searchable {
    fn text(&self, field: TextField) -> &str;
    fn tags(&self) -> &[String];
    fn posted_at(&self) -> Option<OffsetDateTime>;
}

impl Searchable for ProjectRecord {
    fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Title => &self.title,
            TextField::Description => &self.description,
            TextField::Content => "",
        }
    }

    fn tags(&self) -> &[String] {
        &self.tech_stack
    }

    fn posted_at(&self) -> Option<OffsetDateTime> {
        None
    }
}

impl Searchable for BlogRecord {
    fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Title => &self.title,
            TextField::Content => &self.content,
            TextField::Description => "",
        }
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn posted_at(&self) -> Option<OffsetDateTime> {
        Some(self.posted_date)
    }
}

const PROJECT_TEXT: &[TextField] = &[TextField::Title, TextField::Description];
const BLOG_TEXT: &[TextField] = &[TextField::Title, TextField::Content];

/// Builds the predicate for one domain at the requested tier.
///
/// Basic search ORs an exact tag hit into the text match and ignores filters;
/// advanced search drops the tag shortcut and ANDs in the tag overlap and, for
/// blogs only, the posting-date range.
pub fn build_predicate(
    domain: SearchDomain,
    tier: SearchTier,
    criteria: &SearchCriteria,
) -> SearchPredicate {
    let (text_fields, tag_field) = match domain {
        SearchDomain::Projects => (PROJECT_TEXT, TagField::TechStack),
        SearchDomain::Blogs => (BLOG_TEXT, TagField::Tags),
    };

    let needle = criteria.free_text.clone();
    match tier {
        SearchTier::Basic => SearchPredicate {
            tag_contains: Some(needle.clone()),
            needle,
            text_fields,
            tag_field,
            tag_overlap: Vec::new(),
            posted: DateRange::default(),
        },
        SearchTier::Advanced => SearchPredicate {
            needle,
            text_fields,
            tag_field,
            tag_contains: None,
            tag_overlap: criteria.tag_filter.clone(),
            posted: match domain {
                SearchDomain::Blogs => criteria.date_range,
                SearchDomain::Projects => DateRange::default(),
            },
        },
    }
}

impl SearchPredicate {
    pub fn matches<T: Searchable>(&self, record: &T) -> bool {
        self.matches_text(record) && self.matches_overlap(record) && self.matches_posted(record)
    }

    fn matches_text<T: Searchable>(&self, record: &T) -> bool {
        let needle = self.needle.to_lowercase();
        let text_hit = self
            .text_fields
            .iter()
            .any(|field| record.text(*field).to_lowercase().contains(&needle));

        text_hit
            || self
                .tag_contains
                .as_ref()
                .is_some_and(|tag| record.tags().iter().any(|candidate| candidate == tag))
    }

    fn matches_overlap<T: Searchable>(&self, record: &T) -> bool {
        self.tag_overlap.is_empty()
            || record
                .tags()
                .iter()
                .any(|candidate| self.tag_overlap.contains(candidate))
    }

    fn matches_posted<T: Searchable>(&self, record: &T) -> bool {
        if self.posted.is_unbounded() {
            return true;
        }
        record
            .posted_at()
            .is_some_and(|posted| self.posted.contains(posted))
    }
}
