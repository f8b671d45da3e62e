//! Static dataset records — per-role market data, the career-path graph,
//! and the learning-resource pack. All three are loaded once at startup and
//! never mutated by the engine.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Growing,
    Stable,
    Declining,
    #[serde(other)]
    Unknown,
}

impl Default for MarketTrend {
    fn default() -> Self {
        MarketTrend::Unknown
    }
}

impl MarketTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketTrend::Growing => "growing",
            MarketTrend::Stable => "stable",
            MarketTrend::Declining => "declining",
            MarketTrend::Unknown => "unknown",
        }
    }
}

/// A single required (or nice-to-have) skill with its market metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub name: String,
    /// Share of postings mentioning the skill, in [0, 1].
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    #[serde(default = "default_learning_weeks")]
    pub avg_learning_weeks: u32,
}

fn default_frequency() -> f64 {
    0.5
}

fn default_learning_weeks() -> u32 {
    4
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleSkills {
    #[serde(default)]
    pub must_have: Vec<SkillRequirement>,
    #[serde(default)]
    pub nice_to_have: Vec<SkillRequirement>,
}

impl RoleSkills {
    pub fn must_have_names(&self) -> Vec<String> {
        self.must_have.iter().map(|s| s.name.clone()).collect()
    }

    pub fn nice_to_have_names(&self) -> Vec<String> {
        self.nice_to_have.iter().map(|s| s.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryBand {
    pub min: u64,
    pub max: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleSalary {
    #[serde(default)]
    pub entry_level: Option<SalaryBand>,
    #[serde(default)]
    pub mid_level: Option<SalaryBand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRequirements {
    /// How hard the role is to enter regardless of skills, in [0, 1].
    #[serde(default = "default_entry_barrier")]
    pub entry_barrier: f64,
    #[serde(default)]
    pub freshers_accepted: bool,
    #[serde(default)]
    pub experience: Option<String>,
}

fn default_entry_barrier() -> f64 {
    0.5
}

impl Default for RoleRequirements {
    fn default() -> Self {
        RoleRequirements {
            entry_barrier: default_entry_barrier(),
            freshers_accepted: false,
            experience: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleMarket {
    #[serde(default)]
    pub total_jobs: u64,
    #[serde(default)]
    pub trend: MarketTrend,
    #[serde(default)]
    pub growth_rate_yoy: f64,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// One role's full catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMarketRecord {
    pub name: String,
    #[serde(default)]
    pub market_data: RoleMarket,
    #[serde(default)]
    pub salary: RoleSalary,
    #[serde(default)]
    pub requirements: RoleRequirements,
    #[serde(default)]
    pub skills: RoleSkills,
}

// ────────────────────────────────────────────────────────────────────────────
// Career-path graph
// ────────────────────────────────────────────────────────────────────────────

/// An intermediate role the catalog declares as leading toward a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteppingStone {
    pub intermediate_role: String,
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerTransition {
    pub role: String,
    #[serde(default = "default_transition_probability")]
    pub transition_probability: f64,
}

fn default_transition_probability() -> f64 {
    0.5
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerNode {
    #[serde(default)]
    pub typical_next_roles: Vec<CareerTransition>,
}

/// Stepping-stone table and transition graph consumed by the
/// progression-potential check of the alternative ranker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerPathGraph {
    /// target role → declared intermediate roles.
    #[serde(default)]
    pub stepping_stones: BTreeMap<String, Vec<SteppingStone>>,
    /// role → where people typically move next.
    #[serde(default)]
    pub career_graph: BTreeMap<String, CareerNode>,
}

impl CareerPathGraph {
    pub fn from_path(path: &Path) -> Result<Self, AdvisorError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Learning resources
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectIdea {
    pub title: String,
    pub description: String,
}

/// Per-skill resource lists and per-role project ideas used to enrich
/// generated roadmaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningResources {
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<LearningResource>>,
    #[serde(default)]
    pub project_ideas: BTreeMap<String, Vec<ProjectIdea>>,
}

impl LearningResources {
    pub fn from_path(path: &Path) -> Result<Self, AdvisorError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Finds resources for a skill: exact key, then case-insensitive key,
    /// then substring in either direction. Empty when nothing matches.
    pub fn for_skill(&self, skill: &str) -> &[LearningResource] {
        if let Some(list) = self.resources.get(skill) {
            return list;
        }
        let needle = skill.to_lowercase();
        if let Some(list) = self
            .resources
            .iter()
            .find(|(key, _)| key.to_lowercase() == needle)
            .map(|(_, list)| list)
        {
            return list;
        }
        self.resources
            .iter()
            .find(|(key, _)| {
                let key = key.to_lowercase();
                needle.contains(&key) || key.contains(&needle)
            })
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_record_deserializes_with_defaults() {
        let json = r#"{"name": "Data Analyst"}"#;
        let record: RoleMarketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Data Analyst");
        assert_eq!(record.market_data.total_jobs, 0);
        assert_eq!(record.market_data.trend, MarketTrend::Unknown);
        assert_eq!(record.requirements.entry_barrier, 0.5);
        assert!(record.skills.must_have.is_empty());
    }

    #[test]
    fn test_unknown_trend_string_maps_to_unknown() {
        let json = r#""volatile""#;
        let trend: MarketTrend = serde_json::from_str(json).unwrap();
        assert_eq!(trend, MarketTrend::Unknown);
    }

    #[test]
    fn test_skill_requirement_defaults() {
        let json = r#"{"name": "SQL"}"#;
        let skill: SkillRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(skill.frequency, 0.5);
        assert_eq!(skill.avg_learning_weeks, 4);
    }

    #[test]
    fn test_transition_probability_default() {
        let json = r#"{"role": "Data Scientist"}"#;
        let transition: CareerTransition = serde_json::from_str(json).unwrap();
        assert_eq!(transition.transition_probability, 0.5);
    }

    fn make_resources(keys: &[&str]) -> LearningResources {
        LearningResources {
            resources: keys
                .iter()
                .map(|key| {
                    (
                        key.to_string(),
                        vec![LearningResource {
                            title: format!("{key} course"),
                            url: format!("https://example.com/{key}"),
                            kind: "course".to_string(),
                        }],
                    )
                })
                .collect(),
            project_ideas: BTreeMap::new(),
        }
    }

    #[test]
    fn test_resource_lookup_exact_then_case_insensitive() {
        let resources = make_resources(&["SQL", "Python"]);
        assert_eq!(resources.for_skill("SQL").len(), 1);
        assert_eq!(resources.for_skill("python").len(), 1);
    }

    #[test]
    fn test_resource_lookup_substring_fallback() {
        let resources = make_resources(&["Excel"]);
        assert_eq!(resources.for_skill("Advanced Excel").len(), 1);
        assert!(resources.for_skill("Tableau").is_empty());
    }
}
