//! Compiles a [`SearchPredicate`] into a SQL `WHERE` clause.

use sqlx::{Postgres, QueryBuilder};

use crate::application::search::SearchPredicate;

use super::util::contains_pattern;

/// Appends ` WHERE ...` for `predicate` to a query selecting from a single table.
pub(super) fn push_search_filter(qb: &mut QueryBuilder<'_, Postgres>, predicate: &SearchPredicate) {
    let tags = predicate.tag_field.column();
    let pattern = contains_pattern(&predicate.needle);

    qb.push(" WHERE (");
    for (index, field) in predicate.text_fields.iter().enumerate() {
        if index > 0 {
            qb.push(" OR ");
        }
        qb.push(field.column());
        qb.push(" ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\'");
    }
    if let Some(tag) = predicate.tag_contains.as_ref() {
        qb.push(" OR ");
        qb.push(tags);
        qb.push(" @> ARRAY[");
        qb.push_bind(tag.clone());
        qb.push("]::text[]");
    }
    qb.push(")");

    if !predicate.tag_overlap.is_empty() {
        qb.push(" AND ");
        qb.push(tags);
        qb.push(" && ");
        qb.push_bind(predicate.tag_overlap.clone());
        qb.push("::text[]");
    }

    if let Some(from) = predicate.posted.from {
        qb.push(" AND posted_date >= ");
        qb.push_bind(from);
    }
    if let Some(to) = predicate.posted.to {
        qb.push(" AND posted_date <= ");
        qb.push_bind(to);
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::search::{
        SearchCriteria, SearchDomain, SearchTier, build_predicate,
    };

    fn compile(predicate: &SearchPredicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM t");
        push_search_filter(&mut qb, predicate);
        qb.sql().to_string()
    }

    #[test]
    fn basic_project_search_ors_the_tag_shortcut() {
        let predicate = build_predicate(
            SearchDomain::Projects,
            SearchTier::Basic,
            &SearchCriteria::text("React"),
        );
        assert_eq!(
            compile(&predicate),
            "SELECT id FROM t WHERE (title ILIKE $1 ESCAPE '\\' OR description ILIKE $2 ESCAPE '\\' OR tech_stack @> ARRAY[$3]::text[])"
        );
    }

    #[test]
    fn advanced_blog_search_ands_filters() {
        let mut criteria = SearchCriteria::text("rust");
        criteria.tag_filter = vec!["async".into()];
        criteria.date_range.from = Some(datetime!(2024-01-01 0:00 UTC));
        criteria.date_range.to = Some(datetime!(2024-12-31 0:00 UTC));
        let predicate = build_predicate(SearchDomain::Blogs, SearchTier::Advanced, &criteria);

        assert_eq!(
            compile(&predicate),
            "SELECT id FROM t WHERE (title ILIKE $1 ESCAPE '\\' OR content ILIKE $2 ESCAPE '\\') AND tags && $3::text[] AND posted_date >= $4 AND posted_date <= $5"
        );
    }
}
