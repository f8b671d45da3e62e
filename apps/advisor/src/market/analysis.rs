//! Per-(role, student) market analysis — demand, skill gap, salary,
//! competition, and a time-to-job estimate. The output record is the input
//! to every downstream scorer.

use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;
use crate::market::catalog::{demand_score, MarketCatalog};
use crate::models::catalog::{MarketTrend, RoleMarketRecord, SalaryBand, SkillRequirement};
use crate::taxonomy::SkillTaxonomy;

/// Fixed buffer weeks added to every time-to-job estimate.
const PROJECT_WEEKS: u32 = 2;
const PRACTICE_WEEKS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierLabel {
    VeryHigh,
    High,
    Medium,
    Low,
}

pub fn barrier_label(entry_barrier: f64) -> BarrierLabel {
    if entry_barrier >= 0.8 {
        BarrierLabel::VeryHigh
    } else if entry_barrier >= 0.6 {
        BarrierLabel::High
    } else if entry_barrier >= 0.4 {
        BarrierLabel::Medium
    } else {
        BarrierLabel::Low
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredSkills {
    pub must_have: Vec<String>,
    pub nice_to_have: Vec<String>,
}

/// The per-(role, student) analysis record.
///
/// Invariants: `skill_match` is matched/must-have count ratio (0 when the
/// role lists no must-have skills), `missing_skills` is the exact
/// complement of the matched set, `demand_score` is in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub role: String,
    pub demand_score: u32,
    pub active_jobs: u64,
    pub trend: MarketTrend,
    pub growth_rate: f64,
    pub avg_salary_range: String,
    pub entry_barrier: f64,
    pub entry_barrier_label: BarrierLabel,
    pub required_skills: RequiredSkills,
    pub skill_match: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub missing_skills_count: usize,
    pub competition_level: BarrierLabel,
    pub freshers_accepted: bool,
    pub estimated_time_to_job: String,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SkillGapAnalysis {
    pub skill_match: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Matches the student's skills against a role's must-have list.
/// `matched_skills` holds normalized required names; `missing_skills` holds
/// the original names of everything that did not match.
pub fn analyze_skill_gap(
    taxonomy: &SkillTaxonomy,
    must_have: &[String],
    student_skills: &[String],
) -> SkillGapAnalysis {
    let student_normalized: Vec<String> = student_skills
        .iter()
        .map(|skill| taxonomy.normalize(skill))
        .collect();

    let mut matched_skills = Vec::new();
    let mut missing_skills = Vec::new();
    for required in must_have {
        let required_normalized = taxonomy.normalize(required);
        let covered = student_normalized
            .iter()
            .any(|skill| taxonomy.skills_match(&required_normalized, skill));
        if covered {
            matched_skills.push(required_normalized);
        } else {
            missing_skills.push(required.clone());
        }
    }

    let skill_match = if must_have.is_empty() {
        0.0
    } else {
        round2(matched_skills.len() as f64 / must_have.len() as f64)
    };

    SkillGapAnalysis {
        skill_match,
        matched_skills,
        missing_skills,
    }
}

impl MarketCatalog {
    /// Complete market analysis for one (role, student) pair. Returns an
    /// explicit not-found error when the role is absent; the caller must
    /// stop the pipeline and surface the available role names.
    pub fn analyze(
        &self,
        role_name: &str,
        student_skills: &[String],
    ) -> Result<MarketAnalysis, AdvisorError> {
        let record = self
            .find_role(role_name)
            .ok_or_else(|| self.not_found(role_name))?;
        Ok(self.analyze_record(record, student_skills))
    }

    /// Analysis for an already-resolved catalog record.
    pub fn analyze_record(
        &self,
        record: &RoleMarketRecord,
        student_skills: &[String],
    ) -> MarketAnalysis {
        let market = &record.market_data;
        let score = demand_score(market.total_jobs, market.trend, market.growth_rate_yoy);

        let must_have_names = record.skills.must_have_names();
        let gap = analyze_skill_gap(self.taxonomy(), &must_have_names, student_skills);

        let requirements = &record.requirements;
        let label = barrier_label(requirements.entry_barrier);

        MarketAnalysis {
            role: record.name.clone(),
            demand_score: score,
            active_jobs: market.total_jobs,
            trend: market.trend,
            growth_rate: market.growth_rate_yoy,
            avg_salary_range: format_salary_range(record.salary.entry_level.as_ref()),
            entry_barrier: requirements.entry_barrier,
            entry_barrier_label: label,
            required_skills: RequiredSkills {
                must_have: must_have_names,
                nice_to_have: record.skills.nice_to_have_names(),
            },
            skill_match: gap.skill_match,
            matched_skills: gap.matched_skills,
            missing_skills_count: gap.missing_skills.len(),
            missing_skills: gap.missing_skills,
            competition_level: label,
            freshers_accepted: requirements.freshers_accepted,
            estimated_time_to_job: estimate_time_to_job(gap.skill_match, &record.skills.must_have),
            data_source: market.data_source.clone(),
            last_updated: market.last_updated.clone(),
        }
    }
}

/// Entry salary band as a display string. INR renders in lakhs per annum;
/// other currencies with thousands separators.
pub fn format_salary_range(band: Option<&SalaryBand>) -> String {
    let Some(band) = band else {
        return "Not specified".to_string();
    };
    if band.currency == "INR" {
        format!(
            "₹{:.1}-{:.1} LPA",
            band.min as f64 / 100_000.0,
            band.max as f64 / 100_000.0
        )
    } else {
        format!(
            "{} {}-{}",
            band.currency,
            thousands(band.min),
            thousands(band.max)
        )
    }
}

/// Weeks still needed scale with the uncovered share of the must-have
/// learning time, plus fixed project and practice buffers, bucketed into a
/// human-readable range.
fn estimate_time_to_job(skill_match: f64, must_have: &[SkillRequirement]) -> String {
    let total_learning_weeks: u32 = must_have.iter().map(|s| s.avg_learning_weeks).sum();
    let remaining_weeks = (total_learning_weeks as f64 * (1.0 - skill_match)) as u32;
    let total_weeks = remaining_weeks + PROJECT_WEEKS + PRACTICE_WEEKS;

    match total_weeks {
        0..=4 => "1 month".to_string(),
        5..=8 => "2 months".to_string(),
        9..=12 => "3 months".to_string(),
        13..=24 => format!("{} months", total_weeks / 4),
        _ => {
            let months = total_weeks / 4;
            format!("{}-{} months", months, months + 3)
        }
    }
}

pub(crate) fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
