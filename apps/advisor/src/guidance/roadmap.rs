//! Roadmap assembly — prioritizes missing skills, asks the narrator for a
//! step plan, and recovers with the rule-based plan whenever generation or
//! parsing fails. The prioritization ordering is deterministic; only the
//! step prose comes from the narrator.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::guidance::prompts::{ROADMAP_PROMPT_TEMPLATE, ROADMAP_SYSTEM};
use crate::llm_client::{parse_json_reply, TextGenerator};
use crate::market::analysis::MarketAnalysis;
use crate::models::catalog::{LearningResource, LearningResources, ProjectIdea, SkillRequirement};
use crate::models::profile::StudentProfile;

/// Skills offered to the narrator per roadmap request.
const MAX_PROMPT_SKILLS: usize = 8;
/// Learning steps per roadmap (the portfolio step comes on top).
const MAX_LEARNING_STEPS: usize = 6;
/// Resources attached per step after deduplication.
const MAX_STEP_RESOURCES: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A missing skill ordered by the quick-wins-first policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizedSkill {
    pub skill: String,
    pub demand: f64,
    pub difficulty: f64,
    pub learning_weeks: u32,
    pub priority_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub step_number: u32,
    pub title: String,
    pub description: String,
    pub duration_weeks: u32,
    pub success_metric: String,
    pub why_important: String,
    #[serde(default)]
    pub skills_covered: Vec<String>,
    #[serde(default)]
    pub resources: Vec<LearningResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_details: Option<ProjectIdea>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub target_role: String,
    pub roadmap: Vec<RoadmapStep>,
    pub total_duration_weeks: u32,
    pub total_duration_months: f64,
    pub market_alignment_score: f64,
    pub skills_covered: usize,
}

/// An easy, high-impact skill to pick up immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickWin {
    pub step_number: u32,
    pub title: String,
    pub duration_weeks: u32,
    pub difficulty: f64,
}

#[derive(Debug, Deserialize)]
struct GeneratedSteps {
    steps: Vec<RoadmapStep>,
}

// ────────────────────────────────────────────────────────────────────────────
// Prioritization
// ────────────────────────────────────────────────────────────────────────────

/// Orders missing skills by `demand*0.7 + (1-difficulty)*0.3`, descending —
/// high-demand, low-difficulty skills first. Metadata comes from the role's
/// must-have list; skills without metadata default to 0.3 demand and 4
/// weeks.
pub fn prioritize_skills(
    missing_skills: &[String],
    must_have: &[SkillRequirement],
) -> Vec<PrioritizedSkill> {
    let mut prioritized: Vec<PrioritizedSkill> = missing_skills
        .iter()
        .map(|skill| {
            let metadata = must_have.iter().find(|req| &req.name == skill);
            let demand = metadata.map(|m| m.frequency).unwrap_or(0.3);
            let learning_weeks = metadata.map(|m| m.avg_learning_weeks).unwrap_or(4);
            let difficulty = estimate_difficulty(skill);
            PrioritizedSkill {
                skill: skill.clone(),
                demand,
                difficulty,
                learning_weeks,
                priority_score: demand * 0.7 + (1.0 - difficulty) * 0.3,
            }
        })
        .collect();

    prioritized.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    prioritized
}

/// Keyword-bucket difficulty heuristic in [0, 1].
pub fn estimate_difficulty(skill: &str) -> f64 {
    let skill_lower = skill.to_lowercase();

    const HARD: &[&str] = &[
        "machine learning",
        "deep learning",
        "system design",
        "algorithms",
        "data structures",
        "cloud architecture",
    ];
    if HARD.iter().any(|hard| skill_lower.contains(hard)) {
        return 0.9;
    }

    const MEDIUM: &[&str] = &["python", "java", "react", "node.js", "statistics"];
    if MEDIUM.iter().any(|medium| skill_lower.contains(medium)) {
        return 0.6;
    }

    const EASY: &[&str] = &["git", "excel", "html", "css", "sql basics"];
    if EASY.iter().any(|easy| skill_lower.contains(easy)) {
        return 0.3;
    }

    0.5
}

/// Share of must-have skills the roadmap covers. A role with no must-have
/// list scores a neutral 0.5, not 0 or 1.
pub fn market_alignment(steps: &[RoadmapStep], must_have_names: &[String]) -> f64 {
    if must_have_names.is_empty() {
        return 0.5;
    }

    let roadmap_skills: std::collections::HashSet<String> = steps
        .iter()
        .flat_map(|step| step.skills_covered.iter().map(|s| s.to_lowercase()))
        .collect();

    let covered = must_have_names
        .iter()
        .filter(|name| roadmap_skills.contains(&name.to_lowercase()))
        .count();

    round2(covered as f64 / must_have_names.len() as f64)
}

// ────────────────────────────────────────────────────────────────────────────
// Roadmap generation
// ────────────────────────────────────────────────────────────────────────────

/// Builds the complete roadmap for a feasible (or committed-to) goal:
/// narrator-generated steps when possible, the deterministic fallback plan
/// otherwise, then resource enrichment, the portfolio step, and totals.
pub async fn generate_roadmap(
    resources: &LearningResources,
    target_role: &str,
    profile: &StudentProfile,
    market: &MarketAnalysis,
    must_have: &[SkillRequirement],
    duration_weeks: u32,
    narrator: &dyn TextGenerator,
) -> Roadmap {
    let prioritized = prioritize_skills(&market.missing_skills, must_have);

    let steps = match narrate_steps(target_role, profile, market, &prioritized, duration_weeks, narrator)
        .await
    {
        Ok(steps) if !steps.is_empty() => steps,
        Ok(_) => {
            warn!("narrator returned an empty roadmap; using rule-based fallback");
            fallback_roadmap(&prioritized, duration_weeks)
        }
        Err(e) => {
            warn!("roadmap generation failed ({e}); using rule-based fallback");
            fallback_roadmap(&prioritized, duration_weeks)
        }
    };

    let mut steps = enrich_with_resources(resources, steps);
    steps.push(portfolio_step(
        resources,
        target_role,
        &prioritized,
        steps.len() as u32 + 1,
    ));

    let total_duration_weeks: u32 = steps.iter().map(|s| s.duration_weeks).sum();
    let market_alignment_score = market_alignment(&steps, &market.required_skills.must_have);

    info!(
        "roadmap for {target_role}: {} steps over {total_duration_weeks} weeks",
        steps.len()
    );

    Roadmap {
        target_role: target_role.to_string(),
        total_duration_weeks,
        total_duration_months: round1(total_duration_weeks as f64 / 4.0),
        market_alignment_score,
        skills_covered: prioritized.len(),
        roadmap: steps,
    }
}

async fn narrate_steps(
    target_role: &str,
    profile: &StudentProfile,
    market: &MarketAnalysis,
    prioritized: &[PrioritizedSkill],
    duration_weeks: u32,
    narrator: &dyn TextGenerator,
) -> Result<Vec<RoadmapStep>, crate::llm_client::LlmError> {
    let current_skills = profile.all_skills();
    let current_skills_text = if current_skills.is_empty() {
        "None".to_string()
    } else {
        current_skills.join(", ")
    };

    let top_skills: Vec<&PrioritizedSkill> = prioritized.iter().take(MAX_PROMPT_SKILLS).collect();
    let skills_to_learn = top_skills
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {} ({} weeks)", i + 1, s.skill, s.learning_weeks))
        .collect::<Vec<_>>()
        .join("\n");
    let step_count = top_skills.len().min(MAX_LEARNING_STEPS);

    let prompt = ROADMAP_PROMPT_TEMPLATE
        .replace("{target_role}", target_role)
        .replace("{current_skills}", &current_skills_text)
        .replace("{skills_to_learn}", &skills_to_learn)
        .replace("{duration_weeks}", &duration_weeks.to_string())
        .replace("{active_jobs}", &market.active_jobs.to_string())
        .replace(
            "{entry_barrier_pct}",
            &format!("{:.0}", market.entry_barrier * 100.0),
        )
        .replace("{demand_score}", &market.demand_score.to_string())
        .replace("{step_count}", &step_count.to_string());

    let reply = narrator.generate(&prompt, ROADMAP_SYSTEM).await?;
    let generated: GeneratedSteps = parse_json_reply(&reply)?;
    Ok(generated.steps)
}

/// Rule-based roadmap: one step per prioritized skill (max 6), each clamped
/// to the remaining week budget, stopping when the budget is exhausted.
pub fn fallback_roadmap(
    prioritized: &[PrioritizedSkill],
    duration_weeks: u32,
) -> Vec<RoadmapStep> {
    let mut steps = Vec::new();
    let mut week_counter = 0u32;

    for (i, skill) in prioritized.iter().take(MAX_LEARNING_STEPS).enumerate() {
        let remaining = duration_weeks.saturating_sub(week_counter);
        let weeks = skill.learning_weeks.min(remaining);
        if weeks == 0 {
            break;
        }

        steps.push(RoadmapStep {
            step_number: i as u32 + 1,
            title: format!("Learn {}", skill.skill),
            description: format!("Master {} through online courses and practice", skill.skill),
            duration_weeks: weeks,
            success_metric: format!(
                "Complete {} practice exercises in {}",
                weeks * 2,
                skill.skill
            ),
            why_important: "Required skill for target role".to_string(),
            skills_covered: vec![skill.skill.clone()],
            resources: vec![],
            project_details: None,
        });

        week_counter += weeks;
    }

    steps
}

/// Attaches up to two resources per covered skill, deduplicated by URL,
/// capped at three per step.
fn enrich_with_resources(
    resources: &LearningResources,
    steps: Vec<RoadmapStep>,
) -> Vec<RoadmapStep> {
    steps
        .into_iter()
        .map(|mut step| {
            let mut seen_urls = std::collections::HashSet::new();
            let mut step_resources = Vec::new();

            for skill in &step.skills_covered {
                for resource in resources.for_skill(skill).iter().take(2) {
                    if seen_urls.insert(resource.url.clone()) {
                        step_resources.push(resource.clone());
                    }
                }
            }

            step_resources.truncate(MAX_STEP_RESOURCES);
            step.resources = step_resources;
            step
        })
        .collect()
}

/// Final portfolio step: the role's first declared project idea when the
/// resource pack has one, else a generic capstone.
fn portfolio_step(
    resources: &LearningResources,
    target_role: &str,
    prioritized: &[PrioritizedSkill],
    step_number: u32,
) -> RoadmapStep {
    let skills_covered: Vec<String> = prioritized
        .iter()
        .take(5)
        .map(|s| s.skill.clone())
        .collect();

    match resources
        .project_ideas
        .get(target_role)
        .and_then(|ideas| ideas.first())
    {
        Some(idea) => RoadmapStep {
            step_number,
            title: format!("Build Portfolio Project: {}", idea.title),
            description: idea.description.clone(),
            duration_weeks: 2,
            success_metric: "Complete project, deploy to GitHub, write documentation".to_string(),
            why_important: "Portfolio projects are mentioned in 94% of job postings".to_string(),
            skills_covered,
            resources: vec![LearningResource {
                title: "GitHub Repository Guide".to_string(),
                url: "https://guides.github.com/".to_string(),
                kind: "documentation".to_string(),
            }],
            project_details: Some(idea.clone()),
        },
        None => RoadmapStep {
            step_number,
            title: "Build Portfolio Project".to_string(),
            description: format!(
                "Create a comprehensive {target_role} project showcasing your skills"
            ),
            duration_weeks: 2,
            success_metric: "Deploy project, add to GitHub, prepare case study".to_string(),
            why_important: "Demonstrates practical skills to employers".to_string(),
            skills_covered,
            resources: vec![],
            project_details: None,
        },
    }
}

/// Easy missing skills (difficulty below 0.5) worth picking up first.
pub fn quick_wins(missing_skills: &[String]) -> Vec<QuickWin> {
    missing_skills
        .iter()
        .filter(|skill| estimate_difficulty(skill) < 0.5)
        .take(3)
        .enumerate()
        .map(|(i, skill)| QuickWin {
            step_number: i as u32 + 1,
            title: format!("Quick Win: Learn {skill}"),
            duration_weeks: 2,
            difficulty: estimate_difficulty(skill),
        })
        .collect()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
