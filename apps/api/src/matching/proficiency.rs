use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Qualitative skill level held by a student (or targeted by a requirement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown proficiency '{0}' (expected low, medium or high)")]
pub struct UnknownProficiency(pub String);

impl Proficiency {
    pub const ALL: [Proficiency; 3] = [Proficiency::Low, Proficiency::Medium, Proficiency::High];

    /// Numeric capability on the same 0–100 scale as a requirement's level_pct.
    pub fn capability(self) -> u32 {
        match self {
            Proficiency::Low => 40,
            Proficiency::Medium => 75,
            Proficiency::High => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Proficiency::Low => "low",
            Proficiency::Medium => "medium",
            Proficiency::High => "high",
        }
    }

    /// Display label ("Low", "Medium", "High").
    pub fn label(self) -> &'static str {
        match self {
            Proficiency::Low => "Low",
            Proficiency::Medium => "Medium",
            Proficiency::High => "High",
        }
    }

    /// Inverse of `capability` for the three canonical percentages only.
    pub fn from_level_pct(pct: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.capability() == pct)
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Proficiency {
    type Err = UnknownProficiency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Proficiency::Low),
            "medium" => Ok(Proficiency::Medium),
            "high" => Ok(Proficiency::High),
            _ => Err(UnknownProficiency(s.to_string())),
        }
    }
}

/// Human label for a required level: the proficiency name when the percentage
/// is one of the canonical values, otherwise "N%".
pub fn level_label(pct: u32) -> String {
    match Proficiency::from_level_pct(pct) {
        Some(p) => p.label().to_string(),
        None => format!("{pct}%"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_values() {
        assert_eq!(Proficiency::Low.capability(), 40);
        assert_eq!(Proficiency::Medium.capability(), 75);
        assert_eq!(Proficiency::High.capability(), 100);
    }

    #[test]
    fn test_capability_is_ordered() {
        assert!(Proficiency::Low.capability() < Proficiency::Medium.capability());
        assert!(Proficiency::Medium.capability() < Proficiency::High.capability());
        assert!(Proficiency::Low < Proficiency::High);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Proficiency>(), Ok(Proficiency::High));
        assert_eq!(" medium ".parse::<Proficiency>(), Ok(Proficiency::Medium));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "expert".parse::<Proficiency>().unwrap_err();
        assert_eq!(err, UnknownProficiency("expert".to_string()));
    }

    #[test]
    fn test_from_level_pct_only_canonical() {
        assert_eq!(Proficiency::from_level_pct(75), Some(Proficiency::Medium));
        assert_eq!(Proficiency::from_level_pct(50), None);
    }

    #[test]
    fn test_level_label() {
        assert_eq!(level_label(40), "Low");
        assert_eq!(level_label(100), "High");
        assert_eq!(level_label(60), "60%");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Proficiency::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let back: Proficiency = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(back, Proficiency::Low);
    }
}
