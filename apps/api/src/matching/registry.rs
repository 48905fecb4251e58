use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use crate::matching::proficiency::Proficiency;

/// A student's skill → proficiency mapping, as read from storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProficiencyRegistry {
    levels: HashMap<Uuid, Proficiency>,
}

impl ProficiencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from raw `(skill_id, proficiency)` records.
    ///
    /// Values that are not low/medium/high are dropped (with a warning) so the
    /// skill simply counts as absent when scoring.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = (Uuid, &'a str)>,
    {
        let mut levels = HashMap::new();
        for (skill_id, raw) in records {
            match raw.parse::<Proficiency>() {
                Ok(level) => {
                    levels.insert(skill_id, level);
                }
                Err(e) => warn!("Ignoring proficiency record for skill {skill_id}: {e}"),
            }
        }
        Self { levels }
    }

    pub fn get(&self, skill_id: &Uuid) -> Option<Proficiency> {
        self.levels.get(skill_id).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(Uuid, Proficiency)> for ProficiencyRegistry {
    fn from_iter<T: IntoIterator<Item = (Uuid, Proficiency)>>(iter: T) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}
