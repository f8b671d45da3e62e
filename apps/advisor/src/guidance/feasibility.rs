//! Feasibility scoring — the weighted multi-factor model that decides
//! whether a desired role is reachable from the student's current profile.
//!
//! All factor curves are deterministic step functions; the only narrator
//! call is the prose explanation for non-feasible verdicts, and it falls
//! back to a fixed template when generation fails.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::guidance::prompts::{EXPLANATION_PROMPT_TEMPLATE, NARRATOR_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::market::analysis::MarketAnalysis;
use crate::models::profile::{ExperienceLevel, LearningCapacity, StudentProfile};

/// Score at or above which a goal is FEASIBLE.
pub const FEASIBLE_THRESHOLD: f64 = 0.65;
/// Score at or above which a goal is CHALLENGING rather than NOT_FEASIBLE.
pub const CHALLENGING_THRESHOLD: f64 = 0.45;

const CHALLENGING_WARNING: &str =
    "High effort required - consider alternatives or commit to intensive learning";

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Feasible,
    Challenging,
    NotFeasible,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Feasible => "FEASIBLE",
            Verdict::Challenging => "CHALLENGING",
            Verdict::NotFeasible => "NOT_FEASIBLE",
        }
    }
}

/// What the caller should do next with this verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    GenerateDirectRoadmap,
    OfferChoice,
    SuggestReroute,
}

impl NextAction {
    pub fn as_str(self) -> &'static str {
        match self {
            NextAction::GenerateDirectRoadmap => "generate_direct_roadmap",
            NextAction::OfferChoice => "offer_choice",
            NextAction::SuggestReroute => "suggest_reroute",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    SkillGap,
    LowMarketDemand,
    HighEntryBarrier,
    LongLearningPath,
}

/// A structured reason emitted for every factor scoring below 0.5.
/// Consumed by the explanation narrator and by UI display; computed
/// deterministically either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reason {
    #[serde(rename = "type")]
    pub kind: ReasonKind,
    pub severity: Severity,
    pub title: String,
    pub explanation: String,
    pub impact: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FactorScores {
    pub skill_match: f64,
    pub market_demand: f64,
    pub entry_barrier: f64,
    pub time_to_competency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeasibilityResult {
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub action: NextAction,
    pub feasibility_score: f64,
    pub factor_scores: FactorScores,
    pub reasons: Vec<Reason>,
    pub explanation: String,
    pub recommendation: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Factor scoring curves
// ────────────────────────────────────────────────────────────────────────────

/// Step curve over the raw skill-match ratio. Penalizes very low matches
/// more heavily than the raw ratio would.
pub fn skill_score(skill_match: f64) -> f64 {
    if skill_match >= 0.7 {
        1.0
    } else if skill_match >= 0.5 {
        0.8
    } else if skill_match >= 0.3 {
        0.6
    } else if skill_match >= 0.15 {
        0.4
    } else {
        0.2
    }
}

/// Step curve over the normalized demand score (demand_score / 100).
pub fn market_score(demand: f64) -> f64 {
    if demand >= 0.8 {
        1.0
    } else if demand >= 0.6 {
        0.85
    } else if demand >= 0.4 {
        0.65
    } else if demand >= 0.2 {
        0.45
    } else {
        0.25
    }
}

/// Mismatch between the role's entry barrier and the student's experience
/// baseline. A barrier at or below the baseline is a full score; beyond it
/// the gap is bucketed.
pub fn barrier_score(entry_barrier: f64, experience: ExperienceLevel) -> f64 {
    let student_level = experience.barrier_baseline();
    if entry_barrier <= student_level {
        return 1.0;
    }
    let gap = entry_barrier - student_level;
    if gap <= 0.2 {
        0.8
    } else if gap <= 0.4 {
        0.6
    } else if gap <= 0.6 {
        0.4
    } else {
        0.2
    }
}

/// Estimated catch-up time bucketed into a score. Four base weeks per
/// missing skill, stretched by learning capacity.
pub fn time_score(capacity: LearningCapacity, missing_skills_count: usize) -> f64 {
    let base_weeks_per_skill = 4.0;
    let total_weeks = missing_skills_count as f64 * base_weeks_per_skill * capacity.pace_multiplier();

    if total_weeks <= 12.0 {
        1.0
    } else if total_weeks <= 24.0 {
        0.8
    } else if total_weeks <= 36.0 {
        0.6
    } else if total_weeks <= 48.0 {
        0.4
    } else {
        0.2
    }
}

/// Convex combination of the four factors: 0.4 skill + 0.3 market +
/// 0.2 barrier + 0.1 time.
pub fn combine_factors(factors: &FactorScores) -> f64 {
    factors.skill_match * 0.4
        + factors.market_demand * 0.3
        + factors.entry_barrier * 0.2
        + factors.time_to_competency * 0.1
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

struct Decision {
    verdict: Verdict,
    confidence: Confidence,
    action: NextAction,
    warning: Option<&'static str>,
}

/// Verdict thresholds are closed above: exactly 0.65 is FEASIBLE and
/// exactly 0.45 is CHALLENGING.
fn decide(feasibility_score: f64) -> Decision {
    if feasibility_score >= FEASIBLE_THRESHOLD {
        Decision {
            verdict: Verdict::Feasible,
            confidence: Confidence::High,
            action: NextAction::GenerateDirectRoadmap,
            warning: None,
        }
    } else if feasibility_score >= CHALLENGING_THRESHOLD {
        Decision {
            verdict: Verdict::Challenging,
            confidence: Confidence::Medium,
            action: NextAction::OfferChoice,
            warning: Some(CHALLENGING_WARNING),
        }
    } else {
        Decision {
            verdict: Verdict::NotFeasible,
            confidence: Confidence::High,
            action: NextAction::SuggestReroute,
            warning: None,
        }
    }
}

/// Complete feasibility evaluation for one (student, role) pair.
pub async fn evaluate(
    profile: &StudentProfile,
    market: &MarketAnalysis,
    desired_role: &str,
    narrator: &dyn TextGenerator,
) -> FeasibilityResult {
    let factor_scores = FactorScores {
        skill_match: skill_score(market.skill_match),
        market_demand: market_score(market.demand_score as f64 / 100.0),
        entry_barrier: barrier_score(market.entry_barrier, profile.experience_level),
        time_to_competency: time_score(profile.learning_capacity, market.missing_skills_count),
    };

    let raw_score = combine_factors(&factor_scores);
    let decision = decide(raw_score);
    let reasons = build_reasons(&factor_scores, profile, market);

    let explanation = if decision.verdict == Verdict::Feasible {
        format!("Great news! {desired_role} is a feasible career goal for you.")
    } else {
        narrate_explanation(desired_role, decision.verdict, &reasons, profile, market, narrator)
            .await
    };

    let recommendation = decision
        .warning
        .map(str::to_string)
        .unwrap_or_else(|| decision.action.as_str().to_string());

    FeasibilityResult {
        verdict: decision.verdict,
        confidence: decision.confidence,
        action: decision.action,
        feasibility_score: round2(raw_score),
        factor_scores,
        reasons,
        explanation,
        recommendation,
    }
}

/// One structured reason per factor below 0.5, in fixed factor order.
fn build_reasons(
    factors: &FactorScores,
    profile: &StudentProfile,
    market: &MarketAnalysis,
) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if factors.skill_match < 0.5 {
        let severity = if factors.skill_match < 0.3 {
            Severity::Critical
        } else {
            Severity::High
        };
        reasons.push(Reason {
            kind: ReasonKind::SkillGap,
            severity,
            title: "Significant Skill Gap".to_string(),
            explanation: format!(
                "You currently have only {:.0}% of the required skills. Missing {} critical skills.",
                market.skill_match * 100.0,
                market.missing_skills_count
            ),
            impact: "Would require 6-12 months of intensive learning".to_string(),
            missing_skills: market.missing_skills.clone(),
        });
    }

    if factors.market_demand < 0.5 {
        let severity = if factors.market_demand < 0.3 {
            Severity::Critical
        } else {
            Severity::High
        };
        reasons.push(Reason {
            kind: ReasonKind::LowMarketDemand,
            severity,
            title: "Limited Market Opportunities".to_string(),
            explanation: format!(
                "Only {} active job postings found. Market demand score: {}/100.",
                market.active_jobs, market.demand_score
            ),
            impact: "Very competitive job market with limited openings".to_string(),
            missing_skills: vec![],
        });
    }

    if factors.entry_barrier < 0.5 {
        let severity = if factors.entry_barrier < 0.3 {
            Severity::Critical
        } else {
            Severity::Medium
        };
        reasons.push(Reason {
            kind: ReasonKind::HighEntryBarrier,
            severity,
            title: "High Entry Requirements".to_string(),
            explanation: format!(
                "This role has an entry barrier of {:.0}%, but you're at {} level.",
                market.entry_barrier * 100.0,
                profile.experience_level.as_str()
            ),
            impact: "Most positions require significant prior experience or advanced qualifications"
                .to_string(),
            missing_skills: vec![],
        });
    }

    if factors.time_to_competency < 0.5 {
        reasons.push(Reason {
            kind: ReasonKind::LongLearningPath,
            severity: Severity::Medium,
            title: "Extended Learning Timeline".to_string(),
            explanation: format!(
                "Given {} skills to learn, estimated time: {}",
                market.missing_skills_count, market.estimated_time_to_job
            ),
            impact: "Requires sustained long-term commitment".to_string(),
            missing_skills: vec![],
        });
    }

    reasons
}

async fn narrate_explanation(
    desired_role: &str,
    verdict: Verdict,
    reasons: &[Reason],
    profile: &StudentProfile,
    market: &MarketAnalysis,
    narrator: &dyn TextGenerator,
) -> String {
    let reasons_text = reasons
        .iter()
        .map(|r| format!("- {}: {}", r.title, r.explanation))
        .collect::<Vec<_>>()
        .join("\n");

    let missing_preview = market
        .missing_skills
        .iter()
        .take(5)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = EXPLANATION_PROMPT_TEMPLATE
        .replace("{desired_role}", desired_role)
        .replace("{verdict}", verdict.as_str())
        .replace("{reasons}", &reasons_text)
        .replace(
            "{skill_match_pct}",
            &format!("{:.0}", market.skill_match * 100.0),
        )
        .replace("{missing_skills}", &missing_preview)
        .replace("{experience_level}", profile.experience_level.as_str())
        .replace("{active_jobs}", &market.active_jobs.to_string())
        .replace(
            "{entry_barrier_pct}",
            &format!("{:.0}", market.entry_barrier * 100.0),
        )
        .replace("{time_estimate}", &market.estimated_time_to_job);

    match narrator.generate(&prompt, NARRATOR_SYSTEM).await {
        Ok(text) => text,
        Err(e) => {
            warn!("explanation generation failed ({e}); using fallback template");
            fallback_explanation(desired_role, market)
        }
    }
}

/// Deterministic explanation used whenever the narrator fails. This exact
/// wording is the correctness contract for non-feasible explanations.
pub fn fallback_explanation(desired_role: &str, market: &MarketAnalysis) -> String {
    format!(
        "While {} is an exciting career goal, the current job market and skill requirements \
         present significant challenges. With only {:.0}% skill match and {} active positions, \
         there are more strategic paths to explore that align better with your current profile.",
        desired_role,
        market.skill_match * 100.0,
        market.active_jobs
    )
}

/// Independent convenience metric: probability of landing the role as-is.
pub fn success_probability(profile: &StudentProfile, market: &MarketAnalysis) -> f64 {
    let demand = market.demand_score as f64 / 100.0;
    let probability = market.skill_match
        * demand
        * (1.0 - market.entry_barrier * 0.5)
        * profile.experience_level.success_factor();
    round2(probability)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
