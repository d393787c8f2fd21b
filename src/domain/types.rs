//! Shared domain enumerations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Grouping used to render the skills section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    Backend,
    DataAnalytics,
    Frontend,
    SoftSkill,
    SystemAdministration,
    Tool,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 6] = [
        SkillCategory::Frontend,
        SkillCategory::Backend,
        SkillCategory::DataAnalytics,
        SkillCategory::SystemAdministration,
        SkillCategory::Tool,
        SkillCategory::SoftSkill,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::Frontend => "Frontend",
            SkillCategory::Backend => "Backend",
            SkillCategory::DataAnalytics => "DataAnalytics",
            SkillCategory::SystemAdministration => "SystemAdministration",
            SkillCategory::Tool => "Tool",
            SkillCategory::SoftSkill => "SoftSkill",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SkillCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| DomainError::validation(format!("unknown skill category `{value}`")))
    }
}

/// Whether a reaction write inserted a new row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    Created,
    Updated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_round_trip_through_their_names() {
        for category in SkillCategory::ALL {
            assert_eq!(
                SkillCategory::from_str(category.as_str()).expect("known"),
                category
            );
        }
    }

    #[test]
    fn category_names_are_case_sensitive() {
        assert!(SkillCategory::from_str("frontend").is_err());
        assert!(SkillCategory::from_str("DevOps").is_err());
    }

    #[test]
    fn ordering_follows_stored_names() {
        let mut categories = SkillCategory::ALL.to_vec();
        categories.sort();
        let names: Vec<_> = categories.iter().map(|c| c.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
