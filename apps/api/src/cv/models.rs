use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Languages offered first in the CV editor. Anything else is accepted as free text.
pub const SUGGESTED_LANGUAGES: &[&str] = &[
    "English",
    "French",
    "Arabic",
    "Spanish",
    "Chinese (Mandarin)",
    "Russian",
    "Portuguese",
    "German",
    "Hindi",
    "Bengali",
];

/// Common European Framework of Reference level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub objective: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvExperienceRow {
    pub id: Uuid,
    pub cv_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub city: String,
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>, // None = present
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvLanguageRow {
    pub id: Uuid,
    pub cv_id: Uuid,
    pub language: String,
    pub mother_tongue: bool,
    pub listening: Option<String>,
    pub reading: Option<String>,
    pub spoken_interaction: Option<String>,
    pub spoken_production: Option<String>,
    pub writing: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvFields {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub objective: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceInput {
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInput {
    pub language: String,
    #[serde(default)]
    pub mother_tongue: bool,
    pub listening: Option<CefrLevel>,
    pub reading: Option<CefrLevel>,
    pub spoken_interaction: Option<CefrLevel>,
    pub spoken_production: Option<CefrLevel>,
    pub writing: Option<CefrLevel>,
}

/// Full CV submission: main fields plus the complete experience and language lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvSaveRequest {
    pub cv: CvFields,
    #[serde(default)]
    pub experiences: Vec<ExperienceInput>,
    #[serde(default)]
    pub languages: Vec<LanguageInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CvResponse {
    pub cv: CvRow,
    pub experiences: Vec<CvExperienceRow>,
    pub languages: Vec<CvLanguageRow>,
    pub language_choices: &'static [&'static str],
}
