use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cv::models::{CvResponse, CvRow, CvSaveRequest, SUGGESTED_LANGUAGES};
use crate::cv::store;
use crate::cv::validation::{normalize_cv, validate_cv};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/students/:student_id/cv
pub async fn handle_get_cv(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<CvResponse>, AppError> {
    let cv = store::get_or_create_cv(&state.db, student_id).await?;
    Ok(Json(load_cv_response(&state.db, cv).await?))
}

/// PUT /api/v1/students/:student_id/cv
///
/// Validation failures return 422 with every field error; nothing is saved.
pub async fn handle_save_cv(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(mut req): Json<CvSaveRequest>,
) -> Result<Json<CvResponse>, AppError> {
    normalize_cv(&mut req);
    let validation = validate_cv(&req, Utc::now().date_naive());
    if !validation.passed {
        return Err(AppError::UnprocessableEntity(
            serde_json::to_string(&validation).unwrap_or_default(),
        ));
    }

    let cv = store::get_or_create_cv(&state.db, student_id).await?;
    let cv = store::save_cv(&state.db, cv.id, &req).await?;
    Ok(Json(load_cv_response(&state.db, cv).await?))
}

async fn load_cv_response(pool: &PgPool, cv: CvRow) -> Result<CvResponse, AppError> {
    let experiences = store::get_experiences(pool, cv.id).await?;
    let languages = store::get_languages(pool, cv.id).await?;
    Ok(CvResponse {
        cv,
        experiences,
        languages,
        language_choices: SUGGESTED_LANGUAGES,
    })
}
