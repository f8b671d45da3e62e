//! Role catalog — ordered lookup and demand scoring over the static market
//! dataset.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;
use crate::market::analysis::analyze_skill_gap;
use crate::models::catalog::{MarketTrend, RoleMarketRecord};
use crate::taxonomy::SkillTaxonomy;

#[derive(Deserialize)]
struct CatalogFile {
    roles: Vec<RoleMarketRecord>,
}

/// Read-only role catalog. Roles keep their dataset file order: the
/// case-insensitive and substring lookup fallbacks return the first hit in
/// that order, so an ambiguous query like "Analyst" resolves to whichever
/// matching role the dataset lists first.
pub struct MarketCatalog {
    roles: Vec<RoleMarketRecord>,
    taxonomy: Arc<SkillTaxonomy>,
}

impl MarketCatalog {
    pub fn new(roles: Vec<RoleMarketRecord>, taxonomy: Arc<SkillTaxonomy>) -> Self {
        Self { roles, taxonomy }
    }

    pub fn from_path(path: &Path, taxonomy: Arc<SkillTaxonomy>) -> Result<Self, AdvisorError> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        Ok(Self::new(file.roles, taxonomy))
    }

    pub fn roles(&self) -> &[RoleMarketRecord] {
        &self.roles
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    /// Looks a role up by name: exact key, then case-insensitive key, then
    /// substring containment in either direction. Each pass walks the
    /// catalog in file order and the first hit wins.
    pub fn find_role(&self, name: &str) -> Option<&RoleMarketRecord> {
        if let Some(record) = self.roles.iter().find(|r| r.name == name) {
            return Some(record);
        }
        if let Some(record) = self
            .roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
        {
            return Some(record);
        }
        let needle = name.to_lowercase();
        self.roles.iter().find(|r| {
            let key = r.name.to_lowercase();
            key.contains(&needle) || needle.contains(&key)
        })
    }

    pub(crate) fn not_found(&self, role: &str) -> AdvisorError {
        AdvisorError::RoleNotFound {
            role: role.to_string(),
            available_roles: self.role_names(),
        }
    }

    /// Every role scored by current demand, highest first. Ties keep
    /// catalog order.
    pub fn trending_roles(&self, top_n: usize) -> Vec<TrendingRole> {
        let mut scored: Vec<TrendingRole> = self
            .roles
            .iter()
            .map(|record| TrendingRole {
                role: record.name.clone(),
                demand_score: demand_score(
                    record.market_data.total_jobs,
                    record.market_data.trend,
                    record.market_data.growth_rate_yoy,
                ),
                total_jobs: record.market_data.total_jobs,
                trend: record.market_data.trend,
            })
            .collect();

        scored.sort_by(|a, b| b.demand_score.cmp(&a.demand_score));
        scored.truncate(top_n);
        scored
    }

    /// Roles whose must-have skills the student already covers at or above
    /// `min_match`, best match first.
    pub fn roles_for_skills(
        &self,
        student_skills: &[String],
        min_match: f64,
    ) -> Vec<RoleSkillMatch> {
        let mut matching: Vec<RoleSkillMatch> = self
            .roles
            .iter()
            .filter_map(|record| {
                let gap = analyze_skill_gap(
                    &self.taxonomy,
                    &record.skills.must_have_names(),
                    student_skills,
                );
                (gap.skill_match >= min_match).then(|| RoleSkillMatch {
                    role: record.name.clone(),
                    skill_match: gap.skill_match,
                    matched_skills: gap.matched_skills,
                    missing_skills_count: gap.missing_skills.len(),
                })
            })
            .collect();

        matching.sort_by(|a, b| {
            b.skill_match
                .partial_cmp(&a.skill_match)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matching
    }

    /// Side-by-side summary of two roles.
    pub fn compare_roles(
        &self,
        first: &str,
        second: &str,
    ) -> Result<RoleComparison, AdvisorError> {
        let first_record = self.find_role(first).ok_or_else(|| self.not_found(first))?;
        let second_record = self
            .find_role(second)
            .ok_or_else(|| self.not_found(second))?;
        Ok(RoleComparison {
            first: RoleSnapshot::from_record(first_record),
            second: RoleSnapshot::from_record(second_record),
        })
    }
}

/// Demand score on a 0-100 scale: up to 60 points from job volume (5,000
/// postings saturates), up to 25 from trend, up to 15 from year-over-year
/// growth. Clamped to 100.
pub fn demand_score(total_jobs: u64, trend: MarketTrend, growth_rate_yoy: f64) -> u32 {
    let base_score = ((total_jobs as f64 / 5000.0) * 60.0).min(60.0);

    let trend_score = match trend {
        MarketTrend::Growing => 25,
        MarketTrend::Stable => 15,
        MarketTrend::Declining => 5,
        MarketTrend::Unknown => 10,
    };

    let growth_score = if growth_rate_yoy >= 20.0 {
        15
    } else if growth_rate_yoy >= 10.0 {
        10
    } else if growth_rate_yoy >= 0.0 {
        5
    } else {
        0
    };

    (base_score as u32 + trend_score + growth_score).min(100)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingRole {
    pub role: String,
    pub demand_score: u32,
    pub total_jobs: u64,
    pub trend: MarketTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSkillMatch {
    pub role: String,
    pub skill_match: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSnapshot {
    pub role: String,
    pub total_jobs: u64,
    pub trend: MarketTrend,
    pub entry_barrier: f64,
    pub entry_salary_min: u64,
}

impl RoleSnapshot {
    fn from_record(record: &RoleMarketRecord) -> Self {
        RoleSnapshot {
            role: record.name.clone(),
            total_jobs: record.market_data.total_jobs,
            trend: record.market_data.trend,
            entry_barrier: record.requirements.entry_barrier,
            entry_salary_min: record
                .salary
                .entry_level
                .as_ref()
                .map(|band| band.min)
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleComparison {
    pub first: RoleSnapshot,
    pub second: RoleSnapshot,
}
