//! Initial content for a fresh installation.

use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{
    CreateUserParams, RepoError, ServiceParams, ServicesRepo, SkillParams, SkillsRepo, UsersRepo,
};
use crate::application::users::{PasswordHashError, hash_password};
use crate::domain::types::SkillCategory;
use crate::domain::validation::normalize_email;

const SAMPLE_SKILLS: &[(&str, SkillCategory, i32)] = &[
    ("JavaScript", SkillCategory::Frontend, 90),
    ("TypeScript", SkillCategory::Frontend, 85),
    ("React", SkillCategory::Frontend, 85),
    ("Node.js", SkillCategory::Backend, 85),
    ("Express", SkillCategory::Backend, 80),
    ("PostgreSQL", SkillCategory::Backend, 70),
    ("Git", SkillCategory::Tool, 85),
    ("Problem Solving", SkillCategory::SoftSkill, 90),
];

const SAMPLE_SERVICES: &[(&str, &str, &str)] = &[
    (
        "Web Development",
        "Building modern, responsive web applications with React, Node.js, and other technologies.",
        "code",
    ),
    (
        "API Development",
        "Creating robust and scalable RESTful APIs.",
        "api",
    ),
    (
        "UI/UX Design",
        "Designing intuitive and beautiful user interfaces for web applications.",
        "design",
    ),
];

#[derive(Debug, Clone)]
pub struct SeedCommand {
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Password(#[from] PasswordHashError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub skills_created: usize,
    pub services_created: usize,
}

/// Creates the admin account when missing. Sample skills and services are only
/// added to empty tables, so re-running the seed is harmless.
pub async fn seed<R>(repos: Arc<R>, cmd: SeedCommand) -> Result<SeedReport, SeedError>
where
    R: UsersRepo + SkillsRepo + ServicesRepo + ?Sized,
{
    let mut report = SeedReport::default();

    let admin_email = normalize_email(&cmd.admin_email);
    if repos.find_user_by_email(&admin_email).await?.is_none() {
        let password_hash = hash_password(&cmd.admin_password).await?;
        repos
            .create_user(CreateUserParams {
                name: cmd.admin_name,
                email: admin_email,
                password_hash,
            })
            .await?;
        report.admin_created = true;
    }

    if repos.list_skills().await?.is_empty() {
        for (name, category, percentage) in SAMPLE_SKILLS {
            repos
                .create_skill(SkillParams {
                    name: (*name).to_string(),
                    category: *category,
                    percentage: *percentage,
                })
                .await?;
            report.skills_created += 1;
        }
    }

    if repos.list_services().await?.is_empty() {
        for (title, description, icon) in SAMPLE_SERVICES {
            repos
                .create_service(ServiceParams {
                    title: (*title).to_string(),
                    description: (*description).to_string(),
                    icon: Some((*icon).to_string()),
                })
                .await?;
            report.services_created += 1;
        }
    }

    tracing::info!(
        target = "application::seed",
        admin_created = report.admin_created,
        skills = report.skills_created,
        services = report.services_created,
        "seed completed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryRepositories;

    fn command() -> SeedCommand {
        SeedCommand {
            admin_name: "Admin".into(),
            admin_email: "admin@example.com".into(),
            admin_password: "admin123".into(),
        }
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let repos = Arc::new(InMemoryRepositories::new());

        let first = seed(repos.clone(), command()).await.expect("seeded");
        assert!(first.admin_created);
        assert_eq!(first.skills_created, SAMPLE_SKILLS.len());
        assert_eq!(first.services_created, SAMPLE_SERVICES.len());

        let second = seed(repos.clone(), command()).await.expect("seeded again");
        assert_eq!(second, SeedReport::default());
    }
}
