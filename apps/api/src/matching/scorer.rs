//! Match Scorer: compatibility between a student's proficiency registry and a
//! position's weighted skill requirements.
//!
//! Every call site (browse listing, position detail, saved positions) goes
//! through the `MatchScorer` carried in `AppState`, so the formula lives here
//! and nowhere else.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::proficiency::{level_label, Proficiency};
use crate::matching::registry::ProficiencyRegistry;

// ────────────────────────────────────────────────────────────────────────────
// Input / output models
// ────────────────────────────────────────────────────────────────────────────

/// A position's need for one skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub skill_id: Uuid,
    /// Target level on the 0–100 capability scale.
    pub level_pct: u32,
    /// Relative weight versus the position's other requirements.
    pub importance: u32,
}

/// How one requirement contributed to the overall score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementMatch {
    pub skill_id: Uuid,
    pub level_pct: u32,
    pub importance: u32,
    pub weight_pct: f64, // share of the 100 points this requirement carries
    pub required_label: String,
    pub student_proficiency: Option<Proficiency>,
    pub student_label: String,
    pub ratio: f64, // 0.0 – 1.0
    pub contribution: f64,
}

/// Score plus per-requirement detail, in requirement order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub score: f64, // 0 – 100, unrounded
    pub score_display: String,
    pub total_importance: u64,
    pub requirements: Vec<RequirementMatch>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Carried in `AppState` as `Arc<dyn MatchScorer>`. Implementations must be
/// pure: the caller loads the registry and requirements beforehand.
pub trait MatchScorer: Send + Sync {
    fn score(&self, registry: &ProficiencyRegistry, requirements: &[Requirement]) -> f64;

    fn breakdown(
        &self,
        registry: &ProficiencyRegistry,
        requirements: &[Requirement],
    ) -> MatchBreakdown;
}

/// Importance-weighted coverage scorer.
///
/// Algorithm:
/// 1. weight = importance / Σ importance × 100 (Σ = 0 → score 0)
/// 2. ratio  = min(capability / level_pct, 1.0), 0 when the skill is missing
/// 3. score  = Σ weight × ratio
pub struct WeightedMatchScorer;

impl MatchScorer for WeightedMatchScorer {
    fn score(&self, registry: &ProficiencyRegistry, requirements: &[Requirement]) -> f64 {
        compute_match_score(registry, requirements)
    }

    fn breakdown(
        &self,
        registry: &ProficiencyRegistry,
        requirements: &[Requirement],
    ) -> MatchBreakdown {
        compute_match_breakdown(registry, requirements)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_match_score(registry: &ProficiencyRegistry, requirements: &[Requirement]) -> f64 {
    compute_match_breakdown(registry, requirements).score
}

pub fn compute_match_breakdown(
    registry: &ProficiencyRegistry,
    requirements: &[Requirement],
) -> MatchBreakdown {
    let total_importance = total_importance(requirements);

    let mut score = 0.0_f64;
    let mut lines = Vec::with_capacity(requirements.len());

    for (req, weight_pct) in requirements.iter().zip(requirement_weights(requirements)) {
        let student = registry.get(&req.skill_id);
        let ratio = student
            .map(|p| coverage_ratio(p.capability(), req.level_pct))
            .unwrap_or(0.0);
        let contribution = weight_pct * ratio;
        score += contribution;

        lines.push(RequirementMatch {
            skill_id: req.skill_id,
            level_pct: req.level_pct,
            importance: req.importance,
            weight_pct,
            required_label: level_label(req.level_pct),
            student_proficiency: student,
            student_label: student
                .map(|p| p.label().to_string())
                .unwrap_or_else(|| "None".to_string()),
            ratio,
            contribution,
        });
    }

    // Float accumulation can land a hair above 100.
    let score = if total_importance == 0 {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    };

    MatchBreakdown {
        score,
        score_display: format_score(score),
        total_importance,
        requirements: lines,
    }
}

/// Normalised weight (0–100) of each requirement, in input order.
/// All zeros when the total importance is zero.
pub fn requirement_weights(requirements: &[Requirement]) -> Vec<f64> {
    let total = total_importance(requirements);
    requirements
        .iter()
        .map(|r| {
            if total == 0 {
                0.0
            } else {
                r.importance as f64 / total as f64 * 100.0
            }
        })
        .collect()
}

/// One-decimal presentation string. Internal values stay unrounded.
pub fn format_score(score: f64) -> String {
    format!("{score:.1}")
}

fn total_importance(requirements: &[Requirement]) -> u64 {
    requirements.iter().map(|r| r.importance as u64).sum()
}

/// Exceeding the target never over-credits. A zero target is met by any
/// non-zero capability.
fn coverage_ratio(capability: u32, level_pct: u32) -> f64 {
    if level_pct == 0 {
        return if capability > 0 { 1.0 } else { 0.0 };
    }
    (capability as f64 / level_pct as f64).min(1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn req(skill_id: Uuid, level_pct: u32, importance: u32) -> Requirement {
        Requirement {
            skill_id,
            level_pct,
            importance,
        }
    }

    fn registry_with(entries: &[(Uuid, Proficiency)]) -> ProficiencyRegistry {
        entries.iter().copied().collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_requirements_score_zero() {
        let registry = registry_with(&[(Uuid::new_v4(), Proficiency::High)]);
        assert_eq!(compute_match_score(&registry, &[]), 0.0);
    }

    #[test]
    fn test_zero_total_importance_score_zero() {
        let skill = Uuid::new_v4();
        let registry = registry_with(&[(skill, Proficiency::High)]);
        let reqs = vec![req(skill, 50, 0), req(Uuid::new_v4(), 75, 0)];

        let breakdown = compute_match_breakdown(&registry, &reqs);
        assert_eq!(breakdown.score, 0.0);
        assert_eq!(breakdown.total_importance, 0);
        assert!(breakdown.requirements.iter().all(|l| l.weight_pct == 0.0));
    }

    #[test]
    fn test_high_meets_full_requirement() {
        let skill = Uuid::new_v4();
        let registry = registry_with(&[(skill, Proficiency::High)]);
        let score = compute_match_score(&registry, &[req(skill, 100, 1)]);
        assert!(approx(score, 100.0), "Score was {score}");
    }

    #[test]
    fn test_low_against_full_requirement_is_forty() {
        let skill = Uuid::new_v4();
        let registry = registry_with(&[(skill, Proficiency::Low)]);
        let score = compute_match_score(&registry, &[req(skill, 100, 1)]);
        assert!(approx(score, 40.0), "Score was {score}");
    }

    #[test]
    fn test_weighted_partial_coverage() {
        let met = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let registry = registry_with(&[(met, Proficiency::High)]);
        let reqs = vec![req(met, 75, 1), req(missing, 75, 3)];

        let score = compute_match_score(&registry, &reqs);
        assert!(approx(score, 25.0), "Score was {score}");
    }

    #[test]
    fn test_exceeding_requirement_caps_ratio_at_one() {
        let skill = Uuid::new_v4();
        let registry = registry_with(&[(skill, Proficiency::High)]);
        let breakdown = compute_match_breakdown(&registry, &[req(skill, 40, 2)]);
        assert_eq!(breakdown.requirements[0].ratio, 1.0);
        assert!(approx(breakdown.score, 100.0));
    }

    #[test]
    fn test_zero_level_pct_is_satisfied() {
        let skill = Uuid::new_v4();
        let other = Uuid::new_v4();
        let registry = registry_with(&[(skill, Proficiency::Low)]);
        let reqs = vec![req(skill, 0, 1), req(other, 0, 1)];

        let breakdown = compute_match_breakdown(&registry, &reqs);
        assert_eq!(breakdown.requirements[0].ratio, 1.0);
        // Absent skill still contributes nothing, even for a zero target.
        assert_eq!(breakdown.requirements[1].ratio, 0.0);
        assert!(approx(breakdown.score, 50.0));
    }

    #[test]
    fn test_score_monotonic_in_proficiency() {
        let skill = Uuid::new_v4();
        let other = Uuid::new_v4();
        for level_pct in [0, 30, 40, 50, 75, 90, 100] {
            let reqs = vec![req(skill, level_pct, 3), req(other, 60, 2)];
            let mut previous = compute_match_score(&ProficiencyRegistry::new(), &reqs);
            for p in Proficiency::ALL {
                let current = compute_match_score(&registry_with(&[(skill, p)]), &reqs);
                assert!(
                    current >= previous,
                    "level {level_pct}: {p} scored {current} < {previous}"
                );
                previous = current;
            }
        }
    }

    #[test]
    fn test_score_bounded_0_to_100() {
        let skills: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let registry: ProficiencyRegistry =
            skills.iter().map(|s| (*s, Proficiency::High)).collect();
        let reqs: Vec<Requirement> = skills
            .iter()
            .enumerate()
            .map(|(i, s)| req(*s, 10 * i as u32, 1 + i as u32 % 5))
            .collect();

        let score = compute_match_score(&registry, &reqs);
        assert!((0.0..=100.0).contains(&score), "Score was {score}");
        assert!(approx(score, 100.0));
    }

    #[test]
    fn test_breakdown_labels() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let registry = registry_with(&[(known, Proficiency::Medium)]);
        let reqs = vec![req(known, 100, 1), req(unknown, 55, 1)];

        let breakdown = compute_match_breakdown(&registry, &reqs);
        let first = &breakdown.requirements[0];
        assert_eq!(first.required_label, "High");
        assert_eq!(first.student_label, "Medium");
        assert!(approx(first.weight_pct, 50.0));
        assert!(approx(first.contribution, 37.5));

        let second = &breakdown.requirements[1];
        assert_eq!(second.required_label, "55%");
        assert_eq!(second.student_label, "None");
        assert_eq!(second.student_proficiency, None);
        assert_eq!(breakdown.score_display, "37.5");
    }

    #[test]
    fn test_requirement_weights_sum_to_hundred() {
        let reqs = vec![
            req(Uuid::new_v4(), 50, 1),
            req(Uuid::new_v4(), 50, 2),
            req(Uuid::new_v4(), 50, 4),
        ];
        let weights = requirement_weights(&reqs);
        let sum: f64 = weights.iter().sum();
        assert!(approx(sum, 100.0));
        assert!(approx(weights[2], 400.0 / 7.0));
    }

    #[test]
    fn test_format_score_one_decimal() {
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(66.666_666), "66.7");
        assert_eq!(format_score(100.0), "100.0");
    }

    #[test]
    fn test_trait_object_matches_free_function() {
        let skill = Uuid::new_v4();
        let registry = registry_with(&[(skill, Proficiency::Medium)]);
        let reqs = vec![req(skill, 100, 2)];
        let scorer: Box<dyn MatchScorer> = Box::new(WeightedMatchScorer);
        assert_eq!(
            scorer.score(&registry, &reqs),
            compute_match_score(&registry, &reqs)
        );
        assert!(approx(scorer.breakdown(&registry, &reqs).score, 75.0));
    }
}
