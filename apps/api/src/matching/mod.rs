// Skill matching: proficiency levels, the per-student registry, and the
// importance-weighted scorer shared by every position view.

pub mod proficiency;
pub mod registry;
pub mod scorer;

pub use proficiency::Proficiency;
pub use registry::ProficiencyRegistry;
pub use scorer::{
    format_score, requirement_weights, MatchScorer, Requirement, WeightedMatchScorer,
};
