//! Re-evaluation engine — trigger aggregation over a journey's mutable
//! state. Records completions and blockers, decides when the scoring
//! pipeline must run again, and on trigger re-analyzes the market and ranks
//! reroute alternatives.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AdvisorError;
use crate::guidance::alternatives::{AlternativeRanker, RankedAlternative};
use crate::guidance::feasibility::Severity;
use crate::guidance::roadmap::RoadmapStep;
use crate::llm_client::TextGenerator;
use crate::market::analysis::MarketAnalysis;
use crate::market::catalog::MarketCatalog;
use crate::models::catalog::CareerPathGraph;
use crate::progress::journey::{Blocker, Journey};

/// Hours of expected effort per roadmap duration week.
const HOURS_PER_WEEK: f64 = 40.0;
/// Spent/expected ratio beyond which progress counts as overrunning.
const TIME_OVERRUN_FACTOR: f64 = 1.5;
/// Demand drop (percent) that counts as a market decline.
const MARKET_DECLINE_PCT: f64 = -20.0;
/// Learned skills needed before scanning for newly accessible roles.
const NEW_OPPORTUNITY_SKILLS: usize = 3;
/// Minimum skill match for a role to count as newly accessible.
const NEW_OPPORTUNITY_MIN_MATCH: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    AlreadyCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionUpdate {
    pub status: CompletionStatus,
    pub step_number: u32,
    pub progress_percentage: f64,
    pub completed_steps: usize,
    pub remaining_steps: u32,
    pub should_reevaluate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockerUpdate {
    pub step_number: u32,
    pub total_blockers: usize,
    pub attempts: u32,
    pub motivation_level: f64,
    pub should_reevaluate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Performance,
    MarketDecline,
    NewOpportunities,
    SlowProgress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    pub severity: Severity,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketShift {
    pub demand_change_pct: f64,
    pub original_jobs: u64,
    pub current_jobs: u64,
    pub original_demand_score: u32,
    pub current_demand_score: u32,
    pub trend_change: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReevaluationAction {
    Continue,
    SuggestReroute,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reevaluation {
    pub action: ReevaluationAction,
    pub triggers: Vec<Trigger>,
    pub market_shift: MarketShift,
    pub current_market: MarketAnalysis,
    pub alternatives: Vec<RankedAlternative>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub progress_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub session_id: Uuid,
    pub target_role: String,
    pub completed_steps: usize,
    pub total_steps: u32,
    pub progress_percentage: f64,
    pub remaining_steps: u32,
    pub total_hours_spent: f64,
    pub expected_hours: f64,
    pub efficiency_percentage: f64,
    pub blocker_count: usize,
    pub blockers: Vec<Blocker>,
    pub motivation_level: f64,
    pub start_date: chrono::DateTime<Utc>,
    pub last_activity: chrono::DateTime<Utc>,
    pub reroute_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextStep {
    Completed,
    InProgress {
        step_number: u32,
        total_steps: u32,
        step: RoadmapStep,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct ReevaluationEngine {
    ranker: AlternativeRanker,
}

impl ReevaluationEngine {
    pub fn new(catalog: Arc<MarketCatalog>, paths: Arc<CareerPathGraph>) -> Self {
        Self {
            ranker: AlternativeRanker::new(catalog, paths),
        }
    }

    /// Records completion of a roadmap step. Step numbers outside
    /// [1, total_steps] are rejected before any state changes; completing
    /// an already-completed step is a no-op reported as such.
    pub fn record_completion(
        &self,
        journey: &mut Journey,
        step_number: u32,
        time_spent_hours: Option<f64>,
    ) -> Result<CompletionUpdate, AdvisorError> {
        validate_step(journey, step_number)?;

        if journey.completed_steps.contains(&step_number) {
            return Ok(CompletionUpdate {
                status: CompletionStatus::AlreadyCompleted,
                step_number,
                progress_percentage: round1(journey.progress_percentage()),
                completed_steps: journey.completed_steps.len(),
                remaining_steps: journey.total_steps - journey.completed_steps.len() as u32,
                should_reevaluate: false,
            });
        }

        journey.completed_steps.push(step_number);
        journey.current_step = step_number + 1;
        if let Some(hours) = time_spent_hours {
            journey.time_spent.insert(step_number, hours);
        }
        journey.last_activity = Utc::now();

        let should_reevaluate = should_reevaluate(journey);

        Ok(CompletionUpdate {
            status: CompletionStatus::Completed,
            step_number,
            progress_percentage: round1(journey.progress_percentage()),
            completed_steps: journey.completed_steps.len(),
            remaining_steps: journey.total_steps - journey.completed_steps.len() as u32,
            should_reevaluate,
        })
    }

    /// Records a blocker on a step. A repeated report on the same step
    /// increments its attempt count instead of adding a second entry;
    /// motivation drops by 0.2 per distinct blocked step, floored at 0.1.
    pub fn record_blocker(
        &self,
        journey: &mut Journey,
        step_number: u32,
        reason: &str,
    ) -> Result<BlockerUpdate, AdvisorError> {
        validate_step(journey, step_number)?;

        let now = Utc::now();
        let attempts = match journey
            .blocked_steps
            .iter_mut()
            .find(|b| b.step == step_number)
        {
            Some(existing) => {
                existing.attempts += 1;
                existing.last_reported = now;
                existing.attempts
            }
            None => {
                journey.blocked_steps.push(Blocker {
                    step: step_number,
                    reason: reason.to_string(),
                    attempts: 1,
                    first_reported: now,
                    last_reported: now,
                });
                1
            }
        };

        let blocker_count = journey.blocked_steps.len();
        journey.motivation_level = (1.0 - blocker_count as f64 * 0.2).max(0.1);
        journey.last_activity = now;

        let should_reevaluate = should_reevaluate(journey);

        Ok(BlockerUpdate {
            step_number,
            total_blockers: blocker_count,
            attempts,
            motivation_level: journey.motivation_level,
            should_reevaluate,
        })
    }

    /// Re-runs the market analysis for the journey's target, aggregates
    /// triggers, and when any fired, ranks reroute alternatives. Newly
    /// learned skills are folded into the profile in place first.
    pub async fn reevaluate(
        &self,
        journey: &mut Journey,
        narrator: &dyn TextGenerator,
    ) -> Result<Reevaluation, AdvisorError> {
        let learned = skills_learned(journey);
        journey.student_profile.add_learned_skills(&learned);

        let current_skills = journey.student_profile.all_skills();
        let current_market = self
            .ranker
            .catalog
            .analyze(&journey.target_role, &current_skills)?;

        let shift = market_shift(&journey.market_snapshot, &current_market);

        let mut triggers = Vec::new();

        if journey.blocked_steps.len() >= 2 {
            triggers.push(Trigger {
                kind: TriggerKind::Performance,
                severity: Severity::High,
                reason: format!("Blocked on {} steps", journey.blocked_steps.len()),
            });
        }

        if let Some(repeated) = journey.blocked_steps.iter().find(|b| b.attempts >= 3) {
            triggers.push(Trigger {
                kind: TriggerKind::Performance,
                severity: Severity::Critical,
                reason: format!(
                    "Step {} still blocked after {} attempts",
                    repeated.step, repeated.attempts
                ),
            });
        }

        if shift.demand_change_pct < MARKET_DECLINE_PCT {
            triggers.push(Trigger {
                kind: TriggerKind::MarketDecline,
                severity: Severity::High,
                reason: format!(
                    "Job market decreased by {:.0}%",
                    shift.demand_change_pct.abs()
                ),
            });
        }

        if learned.len() >= NEW_OPPORTUNITY_SKILLS {
            let accessible = self
                .ranker
                .catalog
                .roles_for_skills(&current_skills, NEW_OPPORTUNITY_MIN_MATCH);
            if !accessible.is_empty() {
                triggers.push(Trigger {
                    kind: TriggerKind::NewOpportunities,
                    severity: Severity::Low,
                    reason: format!(
                        "Your skills now qualify for {} additional roles",
                        accessible.len().min(3)
                    ),
                });
            }
        }

        if journey.motivation_level < 0.5 {
            triggers.push(Trigger {
                kind: TriggerKind::SlowProgress,
                severity: Severity::Medium,
                reason: "Progress is slower than expected".to_string(),
            });
        }

        let (action, alternatives, recommendation) = if triggers.is_empty() {
            (ReevaluationAction::Continue, Vec::new(), None)
        } else {
            info!(
                "re-evaluation triggered for {} ({} triggers)",
                journey.target_role,
                triggers.len()
            );
            let recommendations = self
                .ranker
                .find_alternatives(
                    &journey.student_profile,
                    &journey.target_role,
                    &current_market,
                    3,
                    narrator,
                )
                .await;
            (
                ReevaluationAction::SuggestReroute,
                recommendations.alternatives,
                Some(recommendation_for(&triggers)),
            )
        };

        Ok(Reevaluation {
            action,
            triggers,
            market_shift: shift,
            current_market,
            alternatives,
            recommendation,
            progress_percentage: round1(journey.progress_percentage()),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trigger logic
// ────────────────────────────────────────────────────────────────────────────

/// Whether the scoring pipeline should run again, true when ANY trigger
/// condition holds:
/// 1. two or more distinct blocked steps,
/// 2. any single step blocked three or more times,
/// 3. a completed-step count that is a fresh positive multiple of three
///    (each checkpoint fires at most once — consumed via `last_checkpoint`),
/// 4. total hours spent exceeding 1.5× the expected hours for the steps
///    completed so far,
/// 5. motivation below 0.5.
pub fn should_reevaluate(journey: &mut Journey) -> bool {
    if journey.blocked_steps.len() >= 2 {
        return true;
    }

    if journey.blocked_steps.iter().any(|b| b.attempts >= 3) {
        return true;
    }

    let completed = journey.completed_steps.len() as u32;
    if completed > 0 && completed % 3 == 0 && journey.last_checkpoint != completed {
        journey.last_checkpoint = completed;
        return true;
    }

    if !journey.completed_steps.is_empty() {
        let total_spent: f64 = journey.time_spent.values().sum();
        let expected = expected_hours(journey);
        if expected > 0.0 && total_spent > expected * TIME_OVERRUN_FACTOR {
            return true;
        }
    }

    journey.motivation_level < 0.5
}

/// Expected effort for completed steps: 40 hours per roadmap duration week.
fn expected_hours(journey: &Journey) -> f64 {
    journey
        .roadmap
        .iter()
        .enumerate()
        .filter(|(i, _)| journey.completed_steps.contains(&(*i as u32 + 1)))
        .map(|(_, step)| step.duration_weeks as f64 * HOURS_PER_WEEK)
        .sum()
}

/// Demand change against the journey's opening snapshot. Zero when the
/// snapshot had no jobs — not an error.
fn market_shift(original: &MarketAnalysis, current: &MarketAnalysis) -> MarketShift {
    let demand_change_pct = if original.active_jobs > 0 {
        (current.active_jobs as f64 - original.active_jobs as f64) / original.active_jobs as f64
            * 100.0
    } else {
        0.0
    };

    MarketShift {
        demand_change_pct: round1(demand_change_pct),
        original_jobs: original.active_jobs,
        current_jobs: current.active_jobs,
        original_demand_score: original.demand_score,
        current_demand_score: current.demand_score,
        trend_change: current.demand_score as i64 - original.demand_score as i64,
    }
}

/// Unique skills covered by completed steps, in roadmap order.
fn skills_learned(journey: &Journey) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut learned = Vec::new();
    for step_number in &journey.completed_steps {
        let index = (*step_number as usize).saturating_sub(1);
        if let Some(step) = journey.roadmap.get(index) {
            for skill in &step.skills_covered {
                if seen.insert(skill.clone()) {
                    learned.push(skill.clone());
                }
            }
        }
    }
    learned
}

fn recommendation_for(triggers: &[Trigger]) -> String {
    let urgent = triggers
        .iter()
        .find(|t| matches!(t.severity, Severity::High | Severity::Critical));

    match urgent.map(|t| t.kind) {
        Some(TriggerKind::Performance) => {
            "Consider switching to an easier role that better matches your current skills"
                .to_string()
        }
        Some(TriggerKind::MarketDecline) => {
            "Market conditions have changed - explore growing career fields".to_string()
        }
        _ => "Review alternative paths that might be better suited to your progress".to_string(),
    }
}

fn validate_step(journey: &Journey, step_number: u32) -> Result<(), AdvisorError> {
    if step_number < 1 || step_number > journey.total_steps {
        return Err(AdvisorError::InvalidStep {
            step: step_number,
            total_steps: journey.total_steps,
        });
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Read-only queries
// ────────────────────────────────────────────────────────────────────────────

pub fn progress_summary(journey: &Journey) -> ProgressSummary {
    let total_hours_spent: f64 = journey.time_spent.values().sum();
    let expected = expected_hours(journey);
    let efficiency_percentage = if total_hours_spent > 0.0 {
        expected / total_hours_spent * 100.0
    } else {
        100.0
    };

    ProgressSummary {
        session_id: journey.session_id,
        target_role: journey.target_role.clone(),
        completed_steps: journey.completed_steps.len(),
        total_steps: journey.total_steps,
        progress_percentage: round1(journey.progress_percentage()),
        remaining_steps: journey.total_steps - journey.completed_steps.len() as u32,
        total_hours_spent: round1(total_hours_spent),
        expected_hours: round1(expected),
        efficiency_percentage: round1(efficiency_percentage),
        blocker_count: journey.blocked_steps.len(),
        blockers: journey.blocked_steps.clone(),
        motivation_level: journey.motivation_level,
        start_date: journey.start_date,
        last_activity: journey.last_activity,
        reroute_count: journey.reroute_count,
    }
}

pub fn next_step(journey: &Journey) -> NextStep {
    if journey.current_step > journey.total_steps {
        return NextStep::Completed;
    }
    let index = (journey.current_step as usize).saturating_sub(1);
    match journey.roadmap.get(index) {
        Some(step) => NextStep::InProgress {
            step_number: journey.current_step,
            total_steps: journey.total_steps,
            step: step.clone(),
        },
        None => NextStep::Completed,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
