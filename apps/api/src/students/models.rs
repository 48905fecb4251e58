use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::ProficiencyRegistry;
use crate::positions::models::PositionRow;

/// A student's proficiency record joined with the skill name.
/// `proficiency` is kept as stored; parsing happens when the registry is built.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentSkillRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedPositionRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub position: PositionRow,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    Added,
    Removed,
}

pub fn registry_from_rows(rows: &[StudentSkillRow]) -> ProficiencyRegistry {
    ProficiencyRegistry::from_records(rows.iter().map(|r| (r.skill_id, r.proficiency.as_str())))
}
