use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::Requirement;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    #[default]
    Coding,
    Management,
    Ai,
}

impl SkillCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::Coding => "coding",
            SkillCategory::Management => "management",
            SkillCategory::Ai => "ai",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    #[default]
    Draft,
    Posted,
    Retracted,
    Deleted,
}

impl PositionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionStatus::Draft => "draft",
            PositionStatus::Posted => "posted",
            PositionStatus::Retracted => "retracted",
            PositionStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for PositionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PositionStatus::Draft),
            "posted" => Ok(PositionStatus::Posted),
            "retracted" => Ok(PositionStatus::Retracted),
            "deleted" => Ok(PositionStatus::Deleted),
            other => Err(format!("unknown position status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TagRow {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PositionRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A position requirement joined with its skill's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementRow {
    pub id: Uuid,
    pub position_id: Uuid,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub level_pct: i32,
    pub importance: i16,
}

impl RequirementRow {
    pub fn to_requirement(&self) -> Requirement {
        Requirement {
            skill_id: self.skill_id,
            level_pct: self.level_pct.max(0) as u32,
            importance: self.importance.max(0) as u32,
        }
    }
}

pub fn to_requirements(rows: &[RequirementRow]) -> Vec<Requirement> {
    rows.iter().map(RequirementRow::to_requirement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            PositionStatus::Draft,
            PositionStatus::Posted,
            PositionStatus::Retracted,
            PositionStatus::Deleted,
        ] {
            assert_eq!(status.as_str().parse::<PositionStatus>(), Ok(status));
        }
        assert!("archived".parse::<PositionStatus>().is_err());
    }

    #[test]
    fn test_to_requirement_clamps_negative_columns() {
        let row = RequirementRow {
            id: Uuid::new_v4(),
            position_id: Uuid::new_v4(),
            skill_id: Uuid::new_v4(),
            skill_name: "Rust".to_string(),
            level_pct: -5,
            importance: 3,
        };
        let req = row.to_requirement();
        assert_eq!(req.level_pct, 0);
        assert_eq!(req.importance, 3);
        assert_eq!(req.skill_id, row.skill_id);
    }
}
