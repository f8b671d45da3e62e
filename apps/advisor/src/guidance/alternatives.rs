//! Alternative-role ranking — scores every other catalog role as a reroute
//! target for a student whose original goal fell through.
//!
//! Each candidate's score depends only on (profile, failed role, candidate
//! record, career-path graph), never on other candidates, so callers may
//! parallel-map `score_candidate` with identical results.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::guidance::prompts::{JUSTIFICATION_PROMPT_TEMPLATE, NARRATOR_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::market::analysis::{format_salary_range, thousands, MarketAnalysis};
use crate::market::catalog::MarketCatalog;
use crate::models::catalog::{CareerPathGraph, MarketTrend, RoleMarketRecord};
use crate::models::profile::{ExperienceLevel, StudentProfile};
use crate::taxonomy::SkillTaxonomy;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-criterion breakdown of an alternative's score. Weights: 0.35 skill
/// overlap, 0.30 market demand, 0.20 progression potential, 0.15 ease of
/// entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total_score: f64,
    pub skill_overlap: f64,
    pub market_demand: f64,
    pub progression_potential: f64,
    pub ease_of_entry: f64,
}

/// Market summary attached to every ranked candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_jobs: u64,
    pub trend: MarketTrend,
    pub growth_rate: f64,
    pub salary_range: String,
    pub entry_barrier: f64,
    pub freshers_accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedAlternative {
    pub role: String,
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    pub market: MarketSummary,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerouteRecommendations {
    pub original_role: String,
    pub alternatives: Vec<RankedAlternative>,
    pub total_alternatives_evaluated: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Ranker
// ────────────────────────────────────────────────────────────────────────────

/// Ranks reroute candidates against the catalog and career-path graph.
pub struct AlternativeRanker {
    pub catalog: Arc<MarketCatalog>,
    pub paths: Arc<CareerPathGraph>,
}

impl AlternativeRanker {
    pub fn new(catalog: Arc<MarketCatalog>, paths: Arc<CareerPathGraph>) -> Self {
        Self { catalog, paths }
    }

    /// Scores and ranks every catalog role except the failed one
    /// (case-insensitive exclusion), then attaches a narrator justification
    /// to the top N — falling back to the deterministic template per
    /// candidate when generation fails.
    pub async fn find_alternatives(
        &self,
        profile: &StudentProfile,
        failed_role: &str,
        failed_analysis: &MarketAnalysis,
        top_n: usize,
        narrator: &dyn TextGenerator,
    ) -> RerouteRecommendations {
        let student_skills = profile.all_skills();

        let mut scored: Vec<RankedAlternative> = self
            .catalog
            .roles()
            .iter()
            .filter(|record| !record.name.eq_ignore_ascii_case(failed_role))
            .map(|record| {
                let breakdown = self.score_candidate(
                    record,
                    failed_role,
                    &student_skills,
                    profile.experience_level,
                );
                RankedAlternative {
                    role: record.name.clone(),
                    total_score: breakdown.total_score,
                    breakdown,
                    market: market_summary(record),
                    justification: String::new(),
                }
            })
            .collect();

        let total_alternatives_evaluated = scored.len();

        // Stable sort: ties keep catalog order.
        scored.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_n);

        for alternative in &mut scored {
            alternative.justification = self
                .narrate_justification(failed_role, failed_analysis, alternative, profile, narrator)
                .await;
        }

        RerouteRecommendations {
            original_role: failed_role.to_string(),
            alternatives: scored,
            total_alternatives_evaluated,
        }
    }

    /// Multi-criteria score for one candidate. Pure in its inputs — safe to
    /// run per candidate in any order or in parallel.
    pub fn score_candidate(
        &self,
        candidate: &RoleMarketRecord,
        failed_role: &str,
        student_skills: &[String],
        experience: ExperienceLevel,
    ) -> ScoreBreakdown {
        let skill_overlap = skill_overlap(
            self.catalog.taxonomy(),
            &candidate.skills.must_have_names(),
            student_skills,
        );

        let market = &candidate.market_data;
        let market_demand =
            market_demand_score(market.total_jobs, market.trend, market.growth_rate_yoy);

        let progression_potential = self.progression_potential(&candidate.name, failed_role);

        let ease_of_entry = ease_of_entry(candidate.requirements.entry_barrier, experience);

        let total_score = skill_overlap * 0.35
            + market_demand * 0.30
            + progression_potential * 0.20
            + ease_of_entry * 0.15;

        ScoreBreakdown {
            total_score: round3(total_score),
            skill_overlap: round3(skill_overlap),
            market_demand: round3(market_demand),
            progression_potential: round3(progression_potential),
            ease_of_entry: round3(ease_of_entry),
        }
    }

    /// How likely the candidate leads back to the original goal, checked in
    /// priority order: declared stepping stone, career-graph transition,
    /// must-have skill-set similarity (scaled so it never beats an explicit
    /// path), then a flat default.
    fn progression_potential(&self, candidate_role: &str, original_role: &str) -> f64 {
        if let Some(stones) = self.paths.stepping_stones.get(original_role) {
            for stone in stones {
                if stone.intermediate_role.eq_ignore_ascii_case(candidate_role) {
                    return if stone.recommended { 0.9 } else { 0.7 };
                }
            }
        }

        if let Some(node) = self.paths.career_graph.get(candidate_role) {
            for next in &node.typical_next_roles {
                if next.role.eq_ignore_ascii_case(original_role) {
                    return next.transition_probability;
                }
            }
        }

        let candidate_record = self.catalog.roles().iter().find(|r| r.name == candidate_role);
        let original_record = self.catalog.roles().iter().find(|r| r.name == original_role);
        if let (Some(candidate), Some(original)) = (candidate_record, original_record) {
            let candidate_skills: HashSet<&str> = candidate
                .skills
                .must_have
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            let original_skills: HashSet<&str> = original
                .skills
                .must_have
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            if !candidate_skills.is_empty() && !original_skills.is_empty() {
                let overlap = candidate_skills.intersection(&original_skills).count() as f64
                    / original_skills.len() as f64;
                return overlap * 0.6;
            }
        }

        0.3
    }

    async fn narrate_justification(
        &self,
        original_role: &str,
        failed_analysis: &MarketAnalysis,
        alternative: &RankedAlternative,
        profile: &StudentProfile,
        narrator: &dyn TextGenerator,
    ) -> String {
        let prompt = JUSTIFICATION_PROMPT_TEMPLATE
            .replace("{original_role}", original_role)
            .replace("{alternative_role}", &alternative.role)
            .replace("{original_jobs}", &failed_analysis.active_jobs.to_string())
            .replace(
                "{original_barrier_pct}",
                &format!("{:.0}", failed_analysis.entry_barrier * 100.0),
            )
            .replace(
                "{original_match_pct}",
                &format!("{:.0}", failed_analysis.skill_match * 100.0),
            )
            .replace(
                "{alternative_jobs}",
                &alternative.market.total_jobs.to_string(),
            )
            .replace(
                "{alternative_barrier_pct}",
                &format!("{:.0}", alternative.market.entry_barrier * 100.0),
            )
            .replace(
                "{skill_overlap_pct}",
                &format!("{:.0}", alternative.breakdown.skill_overlap * 100.0),
            )
            .replace("{salary_range}", &alternative.market.salary_range)
            .replace("{trend}", alternative.market.trend.as_str())
            .replace(
                "{progression_pct}",
                &format!("{:.0}", alternative.breakdown.progression_potential * 100.0),
            )
            .replace("{experience_level}", profile.experience_level.as_str())
            .replace("{strength_areas}", &profile.strength_areas.join(", "));

        match narrator.generate(&prompt, NARRATOR_SYSTEM).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "justification generation failed for {} ({e}); using fallback template",
                    alternative.role
                );
                fallback_justification(original_role, failed_analysis, alternative)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring criteria
// ────────────────────────────────────────────────────────────────────────────

/// Share of the candidate's must-have skills the student already covers.
/// Zero when the candidate lists none.
fn skill_overlap(
    taxonomy: &SkillTaxonomy,
    must_have: &[String],
    student_skills: &[String],
) -> f64 {
    if must_have.is_empty() {
        return 0.0;
    }
    let student_normalized: Vec<String> = student_skills
        .iter()
        .map(|skill| taxonomy.normalize(skill))
        .collect();

    let matches = must_have
        .iter()
        .filter(|required| {
            let required_normalized = taxonomy.normalize(required);
            student_normalized
                .iter()
                .any(|skill| taxonomy.skills_match(&required_normalized, skill))
        })
        .count();

    matches as f64 / must_have.len() as f64
}

/// Normalized demand: job volume saturating at 5,000 postings, scaled by
/// trend, plus a growth bonus capped at 0.2. Clamped to [0, 1].
pub fn market_demand_score(total_jobs: u64, trend: MarketTrend, growth_rate_yoy: f64) -> f64 {
    let base = (total_jobs as f64 / 5000.0).min(1.0);

    let multiplier = match trend {
        MarketTrend::Growing => 1.2,
        MarketTrend::Stable => 1.0,
        MarketTrend::Declining => 0.8,
        MarketTrend::Unknown => 1.0,
    };

    let growth_bonus = (growth_rate_yoy / 100.0).min(0.2);

    (base * multiplier + growth_bonus).clamp(0.0, 1.0)
}

/// Ease of entry relative to the student's experience baseline. Unlike the
/// feasibility barrier curve this is linear: the gap beyond the baseline is
/// scaled by 1.5 and floored at zero.
pub fn ease_of_entry(entry_barrier: f64, experience: ExperienceLevel) -> f64 {
    let student_level = experience.barrier_baseline();
    if entry_barrier <= student_level {
        1.0
    } else {
        (1.0 - (entry_barrier - student_level) * 1.5).max(0.0)
    }
}

fn market_summary(record: &RoleMarketRecord) -> MarketSummary {
    MarketSummary {
        total_jobs: record.market_data.total_jobs,
        trend: record.market_data.trend,
        growth_rate: record.market_data.growth_rate_yoy,
        salary_range: entry_salary_or_unspecified(record),
        entry_barrier: record.requirements.entry_barrier,
        freshers_accepted: record.requirements.freshers_accepted,
    }
}

fn entry_salary_or_unspecified(record: &RoleMarketRecord) -> String {
    match record.salary.entry_level.as_ref() {
        Some(band) if band.currency == "INR" && band.min > 0 => format_salary_range(Some(band)),
        _ => "Not specified".to_string(),
    }
}

/// Deterministic justification used whenever the narrator fails. This exact
/// wording is the correctness contract for candidate justifications.
pub fn fallback_justification(
    original_role: &str,
    failed_analysis: &MarketAnalysis,
    alternative: &RankedAlternative,
) -> String {
    let orig_jobs = failed_analysis.active_jobs;
    let alt_jobs = alternative.market.total_jobs;
    let job_diff = if orig_jobs > 0 {
        (alt_jobs as f64 - orig_jobs as f64) / orig_jobs as f64 * 100.0
    } else {
        0.0
    };
    let direction = if job_diff > 0.0 { "more" } else { "fewer" };

    let mut text = format!(
        "{} offers {} active jobs ({:.0}% {} than {}), with a lower entry barrier \
         ({:.0}% vs {:.0}%). You already have {:.0}% of required skills. ",
        alternative.role,
        thousands(alt_jobs),
        job_diff.abs(),
        direction,
        original_role,
        alternative.market.entry_barrier * 100.0,
        failed_analysis.entry_barrier * 100.0,
        alternative.breakdown.skill_overlap * 100.0,
    );

    if alternative.breakdown.progression_potential > 0.5 {
        text.push_str(&format!(
            "This is a natural stepping stone to {original_role} later."
        ));
    }

    text
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::market::analysis::{BarrierLabel, RequiredSkills};
    use crate::models::catalog::{
        CareerNode, CareerTransition, RoleMarket, SkillRequirement, SteppingStone,
    };
    use crate::models::profile::{LearningCapacity, SkillCategory};

    struct FailingNarrator;

    #[async_trait]
    impl TextGenerator for FailingNarrator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn make_record(name: &str, jobs: u64, barrier: f64, skills: &[&str]) -> RoleMarketRecord {
        RoleMarketRecord {
            name: name.to_string(),
            market_data: RoleMarket {
                total_jobs: jobs,
                trend: MarketTrend::Stable,
                growth_rate_yoy: 5.0,
                data_source: None,
                last_updated: None,
            },
            salary: Default::default(),
            requirements: crate::models::catalog::RoleRequirements {
                entry_barrier: barrier,
                freshers_accepted: true,
                experience: None,
            },
            skills: crate::models::catalog::RoleSkills {
                must_have: skills
                    .iter()
                    .map(|s| SkillRequirement {
                        name: s.to_string(),
                        frequency: 0.8,
                        avg_learning_weeks: 4,
                    })
                    .collect(),
                nice_to_have: vec![],
            },
        }
    }

    fn make_ranker(records: Vec<RoleMarketRecord>, paths: CareerPathGraph) -> AlternativeRanker {
        let catalog = Arc::new(MarketCatalog::new(
            records,
            Arc::new(SkillTaxonomy::default()),
        ));
        AlternativeRanker::new(catalog, Arc::new(paths))
    }

    fn make_profile(skills: &[&str]) -> StudentProfile {
        StudentProfile {
            technical_skills: BTreeMap::from([(
                SkillCategory::Programming,
                skills.iter().map(|s| s.to_string()).collect(),
            )]),
            proficiency_map: BTreeMap::new(),
            experience_level: ExperienceLevel::Beginner,
            learning_capacity: LearningCapacity::Medium,
            strength_areas: vec!["programming".to_string()],
            weakness_areas: vec![],
        }
    }

    fn make_failed_analysis(jobs: u64, barrier: f64) -> MarketAnalysis {
        MarketAnalysis {
            role: "ML Engineer".to_string(),
            demand_score: 40,
            active_jobs: jobs,
            trend: MarketTrend::Stable,
            growth_rate: 5.0,
            avg_salary_range: "Not specified".to_string(),
            entry_barrier: barrier,
            entry_barrier_label: BarrierLabel::VeryHigh,
            required_skills: RequiredSkills {
                must_have: vec![],
                nice_to_have: vec![],
            },
            skill_match: 0.1,
            matched_skills: vec![],
            missing_skills: vec![],
            missing_skills_count: 0,
            competition_level: BarrierLabel::VeryHigh,
            freshers_accepted: false,
            estimated_time_to_job: "8-11 months".to_string(),
            data_source: None,
            last_updated: None,
        }
    }

    #[test]
    fn test_market_demand_score_formula() {
        // 2500/5000 = 0.5 base, stable ×1.0, +0.05 growth
        let score = market_demand_score(2500, MarketTrend::Stable, 5.0);
        assert!((score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_market_demand_score_clamped_to_one() {
        assert_eq!(market_demand_score(10_000, MarketTrend::Growing, 90.0), 1.0);
    }

    #[test]
    fn test_market_demand_growth_bonus_capped() {
        // base 0, bonus capped at 0.2
        let score = market_demand_score(0, MarketTrend::Stable, 80.0);
        assert!((score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_market_demand_never_negative() {
        assert_eq!(market_demand_score(0, MarketTrend::Declining, -50.0), 0.0);
    }

    #[test]
    fn test_ease_of_entry_linear_with_floor() {
        // beginner baseline 0.2; gap 0.4 → 1 - 0.6 = 0.4
        assert!((ease_of_entry(0.6, ExperienceLevel::Beginner) - 0.4).abs() < 1e-9);
        // gap 0.7 → 1 - 1.05 → floored at 0
        assert_eq!(ease_of_entry(0.9, ExperienceLevel::Beginner), 0.0);
        assert_eq!(ease_of_entry(0.2, ExperienceLevel::Beginner), 1.0);
    }

    #[test]
    fn test_progression_stepping_stone_beats_graph() {
        let paths = CareerPathGraph {
            stepping_stones: BTreeMap::from([(
                "ML Engineer".to_string(),
                vec![
                    SteppingStone {
                        intermediate_role: "Data Analyst".to_string(),
                        recommended: true,
                    },
                    SteppingStone {
                        intermediate_role: "Business Analyst".to_string(),
                        recommended: false,
                    },
                ],
            )]),
            career_graph: BTreeMap::from([(
                "Data Analyst".to_string(),
                CareerNode {
                    typical_next_roles: vec![CareerTransition {
                        role: "ML Engineer".to_string(),
                        transition_probability: 0.4,
                    }],
                },
            )]),
        };
        let ranker = make_ranker(vec![], paths);
        assert_eq!(ranker.progression_potential("Data Analyst", "ML Engineer"), 0.9);
        assert_eq!(
            ranker.progression_potential("business analyst", "ML Engineer"),
            0.7
        );
    }

    #[test]
    fn test_progression_career_graph_transition() {
        let paths = CareerPathGraph {
            stepping_stones: BTreeMap::new(),
            career_graph: BTreeMap::from([(
                "Web Developer".to_string(),
                CareerNode {
                    typical_next_roles: vec![CareerTransition {
                        role: "Backend Developer".to_string(),
                        transition_probability: 0.45,
                    }],
                },
            )]),
        };
        let ranker = make_ranker(vec![], paths);
        assert_eq!(
            ranker.progression_potential("Web Developer", "Backend Developer"),
            0.45
        );
    }

    #[test]
    fn test_progression_skill_similarity_fallback() {
        let records = vec![
            make_record("Data Analyst", 1000, 0.3, &["SQL", "Excel", "Python"]),
            make_record("Data Scientist", 800, 0.7, &["SQL", "Python", "Statistics"]),
        ];
        let ranker = make_ranker(records, CareerPathGraph::default());
        // 2 of 3 original skills shared → 2/3 * 0.6 = 0.4
        let potential = ranker.progression_potential("Data Analyst", "Data Scientist");
        assert!((potential - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_progression_default_when_nothing_applies() {
        let ranker = make_ranker(vec![], CareerPathGraph::default());
        assert_eq!(ranker.progression_potential("A", "B"), 0.3);
    }

    #[test]
    fn test_score_candidate_weights_and_bounds() {
        let records = vec![
            make_record("Data Analyst", 5000, 0.2, &["SQL", "Excel"]),
            make_record("ML Engineer", 1000, 0.9, &["Python", "Deep Learning"]),
        ];
        let ranker = make_ranker(records, CareerPathGraph::default());
        let candidate = &ranker.catalog.roles()[0];
        let breakdown = ranker.score_candidate(
            candidate,
            "ML Engineer",
            &["SQL".to_string(), "Excel".to_string()],
            ExperienceLevel::Beginner,
        );

        let expected = breakdown.skill_overlap * 0.35
            + breakdown.market_demand * 0.30
            + breakdown.progression_potential * 0.20
            + breakdown.ease_of_entry * 0.15;
        assert!((breakdown.total_score - round3(expected)).abs() < 1e-9);
        assert!(breakdown.total_score >= 0.0 && breakdown.total_score <= 1.0);
        assert_eq!(breakdown.skill_overlap, 1.0);
        assert_eq!(breakdown.ease_of_entry, 1.0);
    }

    #[tokio::test]
    async fn test_failed_role_never_in_candidates() {
        let records = vec![
            make_record("ML Engineer", 1000, 0.9, &["Python"]),
            make_record("Data Analyst", 5000, 0.2, &["SQL"]),
        ];
        let ranker = make_ranker(records, CareerPathGraph::default());
        let profile = make_profile(&["SQL"]);
        let failed = make_failed_analysis(1000, 0.9);

        let result = ranker
            .find_alternatives(&profile, "ml engineer", &failed, 5, &FailingNarrator)
            .await;

        assert_eq!(result.total_alternatives_evaluated, 1);
        assert!(result
            .alternatives
            .iter()
            .all(|a| !a.role.eq_ignore_ascii_case("ml engineer")));
    }

    #[tokio::test]
    async fn test_alternatives_sorted_descending_and_truncated() {
        let records = vec![
            make_record("Low Fit", 100, 0.9, &["Obscure Skill"]),
            make_record("High Fit", 5000, 0.2, &["SQL"]),
            make_record("Mid Fit", 2000, 0.5, &["SQL", "Obscure Skill"]),
            make_record("ML Engineer", 1000, 0.9, &["Python"]),
        ];
        let ranker = make_ranker(records, CareerPathGraph::default());
        let profile = make_profile(&["SQL"]);
        let failed = make_failed_analysis(1000, 0.9);

        let result = ranker
            .find_alternatives(&profile, "ML Engineer", &failed, 2, &FailingNarrator)
            .await;

        assert_eq!(result.alternatives.len(), 2);
        assert_eq!(result.total_alternatives_evaluated, 3);
        assert_eq!(result.alternatives[0].role, "High Fit");
        assert!(result.alternatives[0].total_score >= result.alternatives[1].total_score);
    }

    #[tokio::test]
    async fn test_fallback_justification_wording() {
        let records = vec![make_record("Data Analyst", 2000, 0.3, &["SQL"])];
        let ranker = make_ranker(records, CareerPathGraph::default());
        let profile = make_profile(&["SQL"]);
        let failed = make_failed_analysis(1000, 0.9);

        let result = ranker
            .find_alternatives(&profile, "ML Engineer", &failed, 1, &FailingNarrator)
            .await;

        let justification = &result.alternatives[0].justification;
        assert!(justification.contains("Data Analyst offers 2,000 active jobs"));
        assert!(justification.contains("100% more than ML Engineer"));
        assert!(justification.contains("30% vs 90%"));
        assert!(justification.contains("You already have 100% of required skills."));
    }

    #[tokio::test]
    async fn test_fallback_mentions_stepping_stone_when_progression_high() {
        let paths = CareerPathGraph {
            stepping_stones: BTreeMap::from([(
                "ML Engineer".to_string(),
                vec![SteppingStone {
                    intermediate_role: "Data Analyst".to_string(),
                    recommended: true,
                }],
            )]),
            career_graph: BTreeMap::new(),
        };
        let records = vec![make_record("Data Analyst", 2000, 0.3, &["SQL"])];
        let ranker = make_ranker(records, paths);
        let profile = make_profile(&["SQL"]);
        let failed = make_failed_analysis(1000, 0.9);

        let result = ranker
            .find_alternatives(&profile, "ML Engineer", &failed, 1, &FailingNarrator)
            .await;

        assert!(result.alternatives[0]
            .justification
            .contains("This is a natural stepping stone to ML Engineer later."));
    }

    #[tokio::test]
    async fn test_zero_original_jobs_avoids_division_by_zero() {
        let records = vec![make_record("Data Analyst", 2000, 0.3, &["SQL"])];
        let ranker = make_ranker(records, CareerPathGraph::default());
        let profile = make_profile(&["SQL"]);
        let failed = make_failed_analysis(0, 0.9);

        let result = ranker
            .find_alternatives(&profile, "ML Engineer", &failed, 1, &FailingNarrator)
            .await;

        assert!(result.alternatives[0]
            .justification
            .contains("(0% fewer than ML Engineer)"));
    }
}
