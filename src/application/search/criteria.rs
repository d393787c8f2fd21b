//! Parsing of raw query-string parameters into typed search criteria.

use thiserror::Error;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use super::SearchDomain;

/// Query-string parameters accepted by the search endpoints.
///
/// Built from raw key/value pairs: a repeated `techStack` or `tags` key is
/// merged into one list, while for every other key the first value wins.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub tech_stack: Option<String>,
    pub tags: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("Search query is required")]
    MissingQuery,
    #[error("Invalid {field} format")]
    InvalidDate { field: &'static str },
}

/// Inclusive bounds on a post's `posted_date`; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.from.is_none_or(|from| from <= instant) && self.to.is_none_or(|to| instant <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub free_text: String,
    pub tag_filter: Vec<String>,
    pub date_range: DateRange,
}

impl SearchCriteria {
    /// Criteria with only the free-text part set.
    pub fn text(free_text: impl Into<String>) -> Self {
        Self {
            free_text: free_text.into(),
            tag_filter: Vec::new(),
            date_range: DateRange::default(),
        }
    }
}

impl FromIterator<(String, String)> for SearchQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = SearchQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => first_wins(&mut query.q, value),
                "techStack" => merge_list(&mut query.tech_stack, value),
                "tags" => merge_list(&mut query.tags, value),
                "dateFrom" => first_wins(&mut query.date_from, value),
                "dateTo" => first_wins(&mut query.date_to, value),
                _ => {}
            }
        }
        query
    }
}

fn first_wins(slot: &mut Option<String>, value: String) {
    slot.get_or_insert(value);
}

fn merge_list(slot: &mut Option<String>, value: String) {
    match slot {
        Some(list) => {
            list.push(',');
            list.push_str(&value);
        }
        None => *slot = Some(value),
    }
}

impl SearchQuery {
    /// Validates the query and turns the filter parameters relevant to `domain`
    /// into typed values. Project searches read `techStack`; blog searches read
    /// `tags`, `dateFrom` and `dateTo`.
    pub fn into_criteria(self, domain: SearchDomain) -> Result<SearchCriteria, CriteriaError> {
        let free_text = required_text(self.q)?;

        let (tag_param, date_range) = match domain {
            SearchDomain::Projects => (self.tech_stack, DateRange::default()),
            SearchDomain::Blogs => {
                let from = parse_date_param(self.date_from.as_deref(), "dateFrom")?;
                let to = parse_date_param(self.date_to.as_deref(), "dateTo")?;
                (self.tags, DateRange { from, to })
            }
        };

        Ok(SearchCriteria {
            free_text,
            tag_filter: split_list(tag_param.as_deref()),
            date_range,
        })
    }

    /// Basic searches only look at `q`; filter parameters are ignored, even malformed ones.
    pub fn into_text_criteria(self) -> Result<SearchCriteria, CriteriaError> {
        required_text(self.q).map(SearchCriteria::text)
    }
}

fn required_text(q: Option<String>) -> Result<String, CriteriaError> {
    q.map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or(CriteriaError::MissingQuery)
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_date_param(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<OffsetDateTime>, CriteriaError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_instant(value)
            .map(Some)
            .ok_or(CriteriaError::InvalidDate { field }),
    }
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_instant(value: &str) -> Option<OffsetDateTime> {
    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(instant);
    }

    let date_only = format_description!("[year]-[month]-[day]");
    Date::parse(value, &date_only)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn query(q: &str) -> SearchQuery {
        SearchQuery {
            q: Some(q.to_string()),
            ..Default::default()
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> SearchQuery {
        raw.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn repeated_list_keys_are_merged() {
        let criteria = pairs(&[
            ("q", "notes"),
            ("tags", "Rust"),
            ("q", "ignored"),
            ("tags", "Go, Zig"),
            ("dateFrom", "2024-01-01"),
            ("dateFrom", "nonsense"),
            ("page", "2"),
        ])
        .into_criteria(SearchDomain::Blogs)
        .expect("valid");

        assert_eq!(criteria.free_text, "notes");
        assert_eq!(criteria.tag_filter, vec!["Rust", "Go", "Zig"]);
        assert_eq!(criteria.date_range.from, Some(datetime!(2024-01-01 0:00 UTC)));
    }

    #[test]
    fn missing_or_blank_query_is_rejected() {
        assert_eq!(
            SearchQuery::default().into_criteria(SearchDomain::Projects),
            Err(CriteriaError::MissingQuery)
        );
        assert_eq!(
            query("   ").into_criteria(SearchDomain::Blogs),
            Err(CriteriaError::MissingQuery)
        );
    }

    #[test]
    fn tech_stack_is_split_trimmed_and_compacted() {
        let criteria = SearchQuery {
            tech_stack: Some(" Rust, ,React ,".to_string()),
            ..query("app")
        }
        .into_criteria(SearchDomain::Projects)
        .expect("valid");

        assert_eq!(criteria.tag_filter, vec!["Rust", "React"]);
        assert!(criteria.date_range.is_unbounded());
    }

    #[test]
    fn project_search_ignores_blog_only_parameters() {
        let criteria = SearchQuery {
            tags: Some("x".to_string()),
            date_from: Some("garbage".to_string()),
            ..query("app")
        }
        .into_criteria(SearchDomain::Projects)
        .expect("valid");

        assert!(criteria.tag_filter.is_empty());
        assert!(criteria.date_range.is_unbounded());
    }

    #[test]
    fn blog_dates_accept_plain_dates_and_timestamps() {
        let criteria = SearchQuery {
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("2024-06-30T12:00:00Z".to_string()),
            ..query("rust")
        }
        .into_criteria(SearchDomain::Blogs)
        .expect("valid");

        assert_eq!(criteria.date_range.from, Some(datetime!(2024-01-01 0:00 UTC)));
        assert_eq!(criteria.date_range.to, Some(datetime!(2024-06-30 12:00 UTC)));
    }

    #[test]
    fn malformed_dates_name_the_offending_parameter() {
        let err = SearchQuery {
            date_to: Some("31/12/2024".to_string()),
            ..query("rust")
        }
        .into_criteria(SearchDomain::Blogs)
        .expect_err("invalid");

        assert_eq!(err, CriteriaError::InvalidDate { field: "dateTo" });
        assert_eq!(err.to_string(), "Invalid dateTo format");
    }

    #[test]
    fn text_criteria_ignore_malformed_filters() {
        let raw = SearchQuery {
            date_from: Some("yesterday".into()),
            tags: Some("rust".into()),
            ..query("  axum ")
        };
        let criteria = raw.into_text_criteria().expect("valid");
        assert_eq!(criteria, SearchCriteria::text("axum"));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange {
            from: Some(datetime!(2024-01-01 0:00 UTC)),
            to: Some(datetime!(2024-01-31 0:00 UTC)),
        };

        assert!(range.contains(datetime!(2024-01-01 0:00 UTC)));
        assert!(range.contains(datetime!(2024-01-31 0:00 UTC)));
        assert!(!range.contains(datetime!(2024-01-31 0:00:01 UTC)));
        assert!(!range.contains(datetime!(2023-12-31 23:59 UTC)));
    }
}
