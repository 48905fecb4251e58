use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cv::models::CvSaveRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvFieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvValidationResult {
    pub passed: bool,
    pub errors: Vec<CvFieldError>,
}

/// Trims free-text fields in place before validation and storage.
pub fn normalize_cv(req: &mut CvSaveRequest) {
    req.cv.email = req.cv.email.trim().to_string();
    req.cv.full_name = req.cv.full_name.trim().to_string();
    for exp in &mut req.experiences {
        exp.job_title = exp.job_title.trim().to_string();
    }
    for lang in &mut req.languages {
        lang.language = lang.language.trim().to_string();
    }
}

/// Validates a CV submission, collecting every failure.
///
/// FAIL conditions:
/// - Email present but not shaped like an address
/// - Experience without a job title
/// - Experience starting after it ends
/// - Experience starting after `today`
/// - Language without a name
pub fn validate_cv(req: &CvSaveRequest, today: NaiveDate) -> CvValidationResult {
    let mut errors = Vec::new();

    let email = req.cv.email.trim();
    if !email.is_empty() && !looks_like_email(email) {
        errors.push(CvFieldError {
            field: "cv.email".to_string(),
            message: format!("'{email}' is not a valid email address"),
        });
    }

    for (i, exp) in req.experiences.iter().enumerate() {
        if exp.job_title.trim().is_empty() {
            errors.push(CvFieldError {
                field: format!("experiences[{i}].job_title"),
                message: "Job title is required.".to_string(),
            });
        }
        if let Some(end) = exp.end_date {
            if exp.start_date > end {
                errors.push(CvFieldError {
                    field: format!("experiences[{i}].start_date"),
                    message: "Start date must be before or equal to end date.".to_string(),
                });
            }
        }
        if exp.start_date > today {
            errors.push(CvFieldError {
                field: format!("experiences[{i}].start_date"),
                message: "Start date cannot be in the future.".to_string(),
            });
        }
    }

    for (i, lang) in req.languages.iter().enumerate() {
        if lang.language.trim().is_empty() {
            errors.push(CvFieldError {
                field: format!("languages[{i}].language"),
                message: "Language name is required.".to_string(),
            });
        }
    }

    CvValidationResult {
        passed: errors.is_empty(),
        errors,
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::models::{CefrLevel, CvFields, ExperienceInput, LanguageInput};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 1)
    }

    fn experience(start: NaiveDate, end: Option<NaiveDate>) -> ExperienceInput {
        ExperienceInput {
            job_title: "Intern".to_string(),
            company: "Acme Corp".to_string(),
            city: String::new(),
            country: String::new(),
            start_date: start,
            end_date: end,
            description: "Did some testing.".to_string(),
        }
    }

    fn language(name: &str) -> LanguageInput {
        LanguageInput {
            language: name.to_string(),
            mother_tongue: false,
            listening: Some(CefrLevel::C2),
            reading: None,
            spoken_interaction: None,
            spoken_production: None,
            writing: Some(CefrLevel::C2),
        }
    }

    fn request(
        email: &str,
        experiences: Vec<ExperienceInput>,
        languages: Vec<LanguageInput>,
    ) -> CvSaveRequest {
        CvSaveRequest {
            cv: CvFields {
                full_name: "Jane Q. Tester".to_string(),
                email: email.to_string(),
                ..CvFields::default()
            },
            experiences,
            languages,
        }
    }

    #[test]
    fn test_minimal_cv_passes() {
        let req = request(
            "jane@example.com",
            vec![experience(date(2020, 1, 1), Some(date(2021, 1, 1)))],
            vec![language("English")],
        );
        let result = validate_cv(&req, today());
        assert!(result.passed, "{:?}", result.errors);
    }

    #[test]
    fn test_empty_cv_passes() {
        assert!(validate_cv(&request("", vec![], vec![]), today()).passed);
    }

    #[test]
    fn test_open_ended_experience_passes() {
        let req = request("", vec![experience(date(2024, 9, 1), None)], vec![]);
        assert!(validate_cv(&req, today()).passed);
    }

    #[test]
    fn test_backwards_dates_fail() {
        let req = request(
            "",
            vec![experience(date(2025, 1, 1), Some(date(2024, 12, 1)))],
            vec![],
        );
        let result = validate_cv(&req, today());
        assert!(!result.passed);
        assert_eq!(result.errors[0].field, "experiences[0].start_date");
        assert!(result.errors[0].message.contains("before or equal"));
    }

    #[test]
    fn test_future_start_fails() {
        let req = request("", vec![experience(date(2025, 7, 1), None)], vec![]);
        let result = validate_cv(&req, today());
        assert!(!result.passed);
        assert!(result.errors[0].message.contains("future"));
    }

    #[test]
    fn test_start_equal_to_end_passes() {
        let d = date(2023, 3, 3);
        let req = request("", vec![experience(d, Some(d))], vec![]);
        assert!(validate_cv(&req, today()).passed);
    }

    #[test]
    fn test_blank_language_fails() {
        let req = request("", vec![], vec![language("English"), language("  ")]);
        let result = validate_cv(&req, today());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "languages[1].language");
    }

    #[test]
    fn test_invalid_email_fails() {
        for bad in ["jane", "jane@", "@example.com", "jane@example", "ja ne@example.com"] {
            let result = validate_cv(&request(bad, vec![], vec![]), today());
            assert!(!result.passed, "{bad} should be rejected");
        }
    }

    #[test]
    fn test_collects_all_errors() {
        let mut exp = experience(date(2026, 1, 1), Some(date(2025, 1, 1)));
        exp.job_title = String::new();
        let req = request("nope", vec![exp], vec![language("")]);
        let result = validate_cv(&req, today());
        // email + job title + backwards dates + future start + language
        assert_eq!(result.errors.len(), 5);
    }

    #[test]
    fn test_normalize_trims_email() {
        let mut req = request("  jane@example.com \n", vec![], vec![language(" French ")]);
        normalize_cv(&mut req);
        assert_eq!(req.cv.email, "jane@example.com");
        assert_eq!(req.languages[0].language, "French");
    }
}
