//! Assessment pipeline — orchestrates one end-to-end evaluation.
//!
//! Flow: market analysis → feasibility verdict → branch: direct roadmap
//! (FEASIBLE), roadmap plus alternatives (CHALLENGING, the offered choice),
//! or alternatives only (NOT_FEASIBLE). An unknown role stops the pipeline
//! with the explicit not-found error before any scoring runs.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AdvisorError;
use crate::guidance::alternatives::{AlternativeRanker, RerouteRecommendations};
use crate::guidance::feasibility::{self, FeasibilityResult, Verdict};
use crate::guidance::roadmap::{generate_roadmap, Roadmap};
use crate::market::analysis::MarketAnalysis;
use crate::models::profile::StudentProfile;
use crate::state::AdvisorState;

/// Alternatives offered when the direct path fails or wobbles.
const ALTERNATIVES_TOP_N: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathType {
    Direct,
    Choice,
    Reroute,
}

/// The complete outcome of one assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub target_role: String,
    pub path_type: PathType,
    pub market_analysis: MarketAnalysis,
    pub feasibility: FeasibilityResult,
    pub success_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roadmap: Option<Roadmap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<RerouteRecommendations>,
    pub message: String,
}

/// Runs the full pipeline for one (student, role) pair.
pub async fn assess(
    state: &AdvisorState,
    profile: &StudentProfile,
    desired_role: &str,
    duration_weeks: u32,
) -> Result<Assessment, AdvisorError> {
    let student_skills = profile.all_skills();
    let market = state.catalog.analyze(desired_role, &student_skills)?;

    let feasibility =
        feasibility::evaluate(profile, &market, desired_role, state.narrator.as_ref()).await;
    let success_probability = feasibility::success_probability(profile, &market);

    info!(
        "assessment for {desired_role}: verdict={} score={}",
        feasibility.verdict.as_str(),
        feasibility.feasibility_score
    );

    let must_have = state
        .catalog
        .find_role(&market.role)
        .map(|record| record.skills.must_have.clone())
        .unwrap_or_default();

    let (path_type, roadmap, alternatives) = match feasibility.verdict {
        Verdict::Feasible => {
            let roadmap = generate_roadmap(
                &state.resources,
                desired_role,
                profile,
                &market,
                &must_have,
                duration_weeks,
                state.narrator.as_ref(),
            )
            .await;
            (PathType::Direct, Some(roadmap), None)
        }
        Verdict::Challenging => {
            let roadmap = generate_roadmap(
                &state.resources,
                desired_role,
                profile,
                &market,
                &must_have,
                duration_weeks,
                state.narrator.as_ref(),
            )
            .await;
            let ranker = AlternativeRanker::new(state.catalog.clone(), state.career_paths.clone());
            let alternatives = ranker
                .find_alternatives(
                    profile,
                    desired_role,
                    &market,
                    ALTERNATIVES_TOP_N,
                    state.narrator.as_ref(),
                )
                .await;
            (PathType::Choice, Some(roadmap), Some(alternatives))
        }
        Verdict::NotFeasible => {
            let ranker = AlternativeRanker::new(state.catalog.clone(), state.career_paths.clone());
            let alternatives = ranker
                .find_alternatives(
                    profile,
                    desired_role,
                    &market,
                    ALTERNATIVES_TOP_N,
                    state.narrator.as_ref(),
                )
                .await;
            (PathType::Reroute, None, Some(alternatives))
        }
    };

    let message = match path_type {
        PathType::Direct => format!(
            "Great news! {desired_role} is a realistic goal for you. Here's your personalized roadmap."
        ),
        PathType::Choice => {
            format!("{desired_role} is achievable but challenging. Consider these options:")
        }
        PathType::Reroute => format!(
            "Based on current market conditions and your profile, consider these strategic \
             alternatives to {desired_role}:"
        ),
    };

    Ok(Assessment {
        target_role: desired_role.to_string(),
        path_type,
        market_analysis: market,
        feasibility,
        success_probability,
        roadmap,
        alternatives,
        message,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::OfflineGenerator;
    use crate::market::catalog::MarketCatalog;
    use crate::models::catalog::{
        CareerPathGraph, LearningResources, MarketTrend, RoleMarket, RoleMarketRecord,
        RoleRequirements, RoleSkills, SkillRequirement,
    };
    use crate::models::profile::{ExperienceLevel, LearningCapacity, SkillCategory};
    use crate::taxonomy::SkillTaxonomy;

    fn make_record(
        name: &str,
        jobs: u64,
        trend: MarketTrend,
        barrier: f64,
        must_have: &[&str],
    ) -> RoleMarketRecord {
        RoleMarketRecord {
            name: name.to_string(),
            market_data: RoleMarket {
                total_jobs: jobs,
                trend,
                growth_rate_yoy: 15.0,
                data_source: None,
                last_updated: None,
            },
            salary: Default::default(),
            requirements: RoleRequirements {
                entry_barrier: barrier,
                freshers_accepted: true,
                experience: None,
            },
            skills: RoleSkills {
                must_have: must_have
                    .iter()
                    .map(|s| SkillRequirement {
                        name: s.to_string(),
                        frequency: 0.9,
                        avg_learning_weeks: 4,
                    })
                    .collect(),
                nice_to_have: vec![],
            },
        }
    }

    fn make_state(records: Vec<RoleMarketRecord>) -> AdvisorState {
        AdvisorState {
            catalog: Arc::new(MarketCatalog::new(
                records,
                Arc::new(SkillTaxonomy::default()),
            )),
            career_paths: Arc::new(CareerPathGraph::default()),
            resources: Arc::new(LearningResources::default()),
            narrator: Arc::new(OfflineGenerator),
        }
    }

    fn make_profile(experience: ExperienceLevel, skills: &[&str]) -> StudentProfile {
        StudentProfile {
            technical_skills: BTreeMap::from([(
                SkillCategory::Programming,
                skills.iter().map(|s| s.to_string()).collect(),
            )]),
            proficiency_map: BTreeMap::new(),
            experience_level: experience,
            learning_capacity: LearningCapacity::High,
            strength_areas: vec![],
            weakness_areas: vec![],
        }
    }

    #[tokio::test]
    async fn test_feasible_goal_gets_direct_roadmap() {
        let state = make_state(vec![
            make_record("Data Analyst", 5000, MarketTrend::Growing, 0.2, &["SQL"]),
            make_record("Web Developer", 3000, MarketTrend::Stable, 0.3, &["HTML"]),
        ]);
        let profile = make_profile(ExperienceLevel::Advanced, &["SQL"]);

        let assessment = assess(&state, &profile, "Data Analyst", 12).await.unwrap();

        assert_eq!(assessment.path_type, PathType::Direct);
        assert_eq!(assessment.feasibility.verdict, Verdict::Feasible);
        assert!(assessment.roadmap.is_some());
        assert!(assessment.alternatives.is_none());
        assert!(assessment.message.starts_with("Great news!"));
    }

    #[tokio::test]
    async fn test_infeasible_goal_gets_alternatives_only() {
        let state = make_state(vec![
            make_record(
                "ML Engineer",
                200,
                MarketTrend::Declining,
                0.95,
                &["Machine Learning", "Deep Learning", "Statistics", "Python"],
            ),
            make_record("Data Analyst", 5000, MarketTrend::Growing, 0.2, &["SQL"]),
        ]);
        let profile = make_profile(ExperienceLevel::Beginner, &["Excel"]);

        let assessment = assess(&state, &profile, "ML Engineer", 12).await.unwrap();

        assert_eq!(assessment.path_type, PathType::Reroute);
        assert_eq!(assessment.feasibility.verdict, Verdict::NotFeasible);
        assert!(assessment.roadmap.is_none());

        let alternatives = assessment.alternatives.unwrap();
        assert_eq!(alternatives.alternatives.len(), 1);
        assert_eq!(alternatives.alternatives[0].role, "Data Analyst");
    }

    #[tokio::test]
    async fn test_challenging_goal_offers_both_paths() {
        // skill_match 0.25 → 0.4; demand 44 → 0.65; barrier gap 0.3 → 0.6;
        // 3 missing at high capacity → 1.0. Weighted: 0.575 — CHALLENGING.
        let mut record = make_record(
            "Backend Developer",
            2000,
            MarketTrend::Stable,
            0.5,
            &["Python", "SQL", "Django", "Docker"],
        );
        record.market_data.growth_rate_yoy = 5.0;
        let state = make_state(vec![
            record,
            make_record("Data Analyst", 4000, MarketTrend::Growing, 0.2, &["SQL"]),
        ]);
        let profile = make_profile(ExperienceLevel::Beginner, &["Python"]);

        let assessment = assess(&state, &profile, "Backend Developer", 12)
            .await
            .unwrap();

        assert_eq!(assessment.feasibility.verdict, Verdict::Challenging);
        assert_eq!(assessment.path_type, PathType::Choice);
        assert!(assessment.roadmap.is_some());
        assert!(assessment.alternatives.is_some());
    }

    #[tokio::test]
    async fn test_unknown_role_stops_pipeline() {
        let state = make_state(vec![make_record(
            "Data Analyst",
            5000,
            MarketTrend::Growing,
            0.2,
            &["SQL"],
        )]);
        let profile = make_profile(ExperienceLevel::Beginner, &["SQL"]);

        let result = assess(&state, &profile, "Astronaut", 12).await;
        match result {
            Err(AdvisorError::RoleNotFound {
                role,
                available_roles,
            }) => {
                assert_eq!(role, "Astronaut");
                assert_eq!(available_roles, vec!["Data Analyst".to_string()]);
            }
            other => panic!("Expected RoleNotFound, got {other:?}"),
        }
    }
}
