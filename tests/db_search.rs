//! Postgres adapter checks. Run with `DATABASE_URL` set and `--ignored`.

use portfolio_api::application::repos::{
    BlogsRepo, CreateBlogParams, CreateCommentParams, CreateProjectParams, CreateSubscriberParams,
    ProjectsRepo, RepoError, SubscribersRepo, UpsertReactionParams,
};
use portfolio_api::application::search::{
    SearchCriteria, SearchDomain, SearchTier, build_predicate, parse_instant,
};
use portfolio_api::domain::types::ReactionOutcome;
use portfolio_api::infra::db::PostgresRepositories;
use sqlx::PgPool;
use time::macros::datetime;

fn project(title: &str, description: &str, stack: &[&str]) -> CreateProjectParams {
    CreateProjectParams {
        title: title.to_string(),
        description: description.to_string(),
        tech_stack: stack.iter().map(|s| s.to_string()).collect(),
        github_link: None,
        live_link: None,
        image_url: None,
    }
}

fn blog(title: &str, tags: &[&str], posted: time::OffsetDateTime) -> CreateBlogParams {
    CreateBlogParams {
        title: title.to_string(),
        content: format!("{title} body"),
        cover_image: None,
        tags: tags.iter().map(|s| s.to_string()).collect(),
        posted_date: posted,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn project_search_matches_text_or_exact_tag(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    repos
        .create_project(project("Realtime dashboard", "Charts", &["React"]))
        .await
        .expect("project");
    repos
        .create_project(project("100% coverage", "Tests_first", &["Rust"]))
        .await
        .expect("project");

    let basic = |q: &str| {
        build_predicate(
            SearchDomain::Projects,
            SearchTier::Basic,
            &SearchCriteria::text(q),
        )
    };

    let by_tag = repos.search_projects(&basic("React")).await.expect("search");
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].title, "Realtime dashboard");

    let by_case = repos.search_projects(&basic("CHARTS")).await.expect("search");
    assert_eq!(by_case.len(), 1);

    let literal_percent = repos.search_projects(&basic("0%")).await.expect("search");
    assert_eq!(literal_percent.len(), 1);
    assert_eq!(literal_percent[0].title, "100% coverage");

    let literal_underscore = repos.search_projects(&basic("s_f")).await.expect("search");
    assert_eq!(literal_underscore.len(), 1);

    let wildcard_only = repos.search_projects(&basic("%")).await.expect("search");
    assert_eq!(wildcard_only.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn advanced_blog_search_filters_tags_and_dates(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let old = repos
        .create_blog(blog("Old rust notes", &["Rust"], datetime!(2023-01-10 00:00 UTC)))
        .await
        .expect("blog");
    repos
        .create_blog(blog("New rust notes", &["Rust"], datetime!(2024-06-01 00:00 UTC)))
        .await
        .expect("blog");
    repos
        .create_blog(blog("React notes", &["React"], datetime!(2024-06-01 00:00 UTC)))
        .await
        .expect("blog");

    for n in 0..7 {
        repos
            .create_comment(CreateCommentParams {
                blog_id: old.id,
                name: format!("reader {n}"),
                email: "reader@example.com".to_string(),
                comment: "nice".to_string(),
            })
            .await
            .expect("comment");
    }

    let mut criteria = SearchCriteria::text("notes");
    criteria.tag_filter = vec!["Rust".to_string()];
    criteria.date_range.to = parse_instant("2023-12-31");
    let predicate = build_predicate(SearchDomain::Blogs, SearchTier::Advanced, &criteria);

    let hits = repos.search_blogs(&predicate, 5).await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].blog.title, "Old rust notes");
    assert_eq!(hits[0].comments.len(), 5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn reactions_upsert_per_email(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let post = repos
        .create_blog(blog("Hello", &[], datetime!(2024-01-01 00:00 UTC)))
        .await
        .expect("blog");

    let reaction = |value: &str| UpsertReactionParams {
        blog_id: post.id,
        user_email: "ann@example.com".to_string(),
        reaction: value.to_string(),
    };

    let (_, first) = repos.upsert_reaction(reaction("like")).await.expect("first");
    let (updated, second) = repos.upsert_reaction(reaction("love")).await.expect("second");
    assert_eq!(first, ReactionOutcome::Created);
    assert_eq!(second, ReactionOutcome::Updated);
    assert_eq!(updated.reaction, "love");
    assert_eq!(repos.list_reactions(post.id).await.expect("list").len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_subscribers_are_reported(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let params = CreateSubscriberParams {
        email: "reader@example.com".to_string(),
        name: None,
    };

    repos
        .create_subscriber(params.clone())
        .await
        .expect("first subscribe");
    let err = repos
        .create_subscriber(params)
        .await
        .expect_err("duplicate should fail");
    assert!(matches!(err, RepoError::Duplicate { .. }), "{err:?}");
}
