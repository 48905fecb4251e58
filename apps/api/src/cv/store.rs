use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::cv::models::{CvExperienceRow, CvLanguageRow, CvRow, CvSaveRequest};
use crate::errors::AppError;
use crate::students::store::ensure_student;

/// Returns the student's CV, creating an empty one on first access.
pub async fn get_or_create_cv(pool: &PgPool, student_id: Uuid) -> Result<CvRow, AppError> {
    ensure_student(pool, student_id).await?;

    sqlx::query("INSERT INTO cvs (id, student_id) VALUES ($1, $2) ON CONFLICT (student_id) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(student_id)
        .execute(pool)
        .await?;

    Ok(
        sqlx::query_as::<_, CvRow>("SELECT * FROM cvs WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(pool)
            .await?,
    )
}

/// Experiences, most recent start first.
pub async fn get_experiences(pool: &PgPool, cv_id: Uuid) -> Result<Vec<CvExperienceRow>, AppError> {
    Ok(sqlx::query_as::<_, CvExperienceRow>(
        "SELECT * FROM cv_experiences WHERE cv_id = $1 ORDER BY start_date DESC",
    )
    .bind(cv_id)
    .fetch_all(pool)
    .await?)
}

/// Languages, mother tongues first.
pub async fn get_languages(pool: &PgPool, cv_id: Uuid) -> Result<Vec<CvLanguageRow>, AppError> {
    Ok(sqlx::query_as::<_, CvLanguageRow>(
        "SELECT * FROM cv_languages WHERE cv_id = $1 ORDER BY mother_tongue DESC, language",
    )
    .bind(cv_id)
    .fetch_all(pool)
    .await?)
}

/// Overwrites the CV fields and replaces its experience and language lists
/// in one transaction.
pub async fn save_cv(pool: &PgPool, cv_id: Uuid, req: &CvSaveRequest) -> Result<CvRow, AppError> {
    let mut tx = pool.begin().await?;

    let cv = sqlx::query_as::<_, CvRow>(
        r#"
        UPDATE cvs
        SET full_name = $2, email = $3, phone = $4, address = $5, objective = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(cv_id)
    .bind(&req.cv.full_name)
    .bind(&req.cv.email)
    .bind(&req.cv.phone)
    .bind(&req.cv.address)
    .bind(&req.cv.objective)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM cv_experiences WHERE cv_id = $1")
        .bind(cv_id)
        .execute(&mut *tx)
        .await?;

    for exp in &req.experiences {
        sqlx::query(
            r#"
            INSERT INTO cv_experiences
                (id, cv_id, job_title, company, city, country, start_date, end_date, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cv_id)
        .bind(&exp.job_title)
        .bind(&exp.company)
        .bind(&exp.city)
        .bind(&exp.country)
        .bind(exp.start_date)
        .bind(exp.end_date)
        .bind(&exp.description)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM cv_languages WHERE cv_id = $1")
        .bind(cv_id)
        .execute(&mut *tx)
        .await?;

    for lang in &req.languages {
        sqlx::query(
            r#"
            INSERT INTO cv_languages
                (id, cv_id, language, mother_tongue, listening, reading,
                 spoken_interaction, spoken_production, writing)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cv_id)
        .bind(&lang.language)
        .bind(lang.mother_tongue)
        .bind(lang.listening.map(|l| l.as_str()))
        .bind(lang.reading.map(|l| l.as_str()))
        .bind(lang.spoken_interaction.map(|l| l.as_str()))
        .bind(lang.spoken_production.map(|l| l.as_str()))
        .bind(lang.writing.map(|l| l.as_str()))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Saved CV {cv_id} ({} experience(s), {} language(s))",
        req.experiences.len(),
        req.languages.len()
    );
    Ok(cv)
}
