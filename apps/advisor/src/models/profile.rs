//! Student profile — the normalized output of the external profile-analysis
//! collaborator. The engine only reads it, with one exception: newly learned
//! skills are appended to the synthetic `learned` category as a journey
//! progresses (an in-place mutation, not a copy).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Skill category labels used both by the taxonomy and by the profile's
/// `technical_skills` map. `Learned` is synthetic: it never appears in the
/// taxonomy and is only appended during a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    WebDevelopment,
    Databases,
    DataScience,
    Devops,
    AiMl,
    Tools,
    Other,
    Learned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    /// Entry-barrier baseline the student brings to a role: a barrier at or
    /// below this value costs nothing.
    pub fn barrier_baseline(self) -> f64 {
        match self {
            ExperienceLevel::Beginner => 0.2,
            ExperienceLevel::Intermediate => 0.5,
            ExperienceLevel::Advanced => 0.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    /// Multiplier applied in the success-probability model.
    pub fn success_factor(self) -> f64 {
        match self {
            ExperienceLevel::Beginner => 0.7,
            ExperienceLevel::Intermediate => 0.85,
            ExperienceLevel::Advanced => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningCapacity {
    Low,
    Medium,
    High,
}

impl LearningCapacity {
    /// Stretch factor on estimated learning weeks — lower capacity means
    /// the same skills take longer.
    pub fn pace_multiplier(self) -> f64 {
        match self {
            LearningCapacity::High => 1.0,
            LearningCapacity::Medium => 1.3,
            LearningCapacity::Low => 1.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
}

/// Normalized student profile. Produced once per assessment by the external
/// profile-analysis collaborator; consumed read-only by every scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub technical_skills: BTreeMap<SkillCategory, Vec<String>>,
    #[serde(default)]
    pub proficiency_map: BTreeMap<String, Proficiency>,
    pub experience_level: ExperienceLevel,
    pub learning_capacity: LearningCapacity,
    #[serde(default)]
    pub strength_areas: Vec<String>,
    #[serde(default)]
    pub weakness_areas: Vec<String>,
}

impl StudentProfile {
    /// Flattens every category into one deduplicated skill list, preserving
    /// first-seen order across categories.
    pub fn all_skills(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut skills = Vec::new();
        for category_skills in self.technical_skills.values() {
            for skill in category_skills {
                if seen.insert(skill.clone()) {
                    skills.push(skill.clone());
                }
            }
        }
        skills
    }

    /// Records newly learned skills under the synthetic `learned` category,
    /// mutating the profile in place. Names already recorded are skipped.
    pub fn add_learned_skills(&mut self, skills: &[String]) {
        let learned = self
            .technical_skills
            .entry(SkillCategory::Learned)
            .or_default();
        for skill in skills {
            if !learned.contains(skill) {
                learned.push(skill.clone());
            }
        }
    }
}
