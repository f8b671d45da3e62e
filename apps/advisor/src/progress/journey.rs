//! Journey state — the per-session record mutated by step completions and
//! blocker reports, plus the session-store capability that owns persistence.
//! The engine itself is storage-free: it receives and returns `Journey`
//! values (see `SessionStore`).

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AdvisorError;
use crate::guidance::roadmap::RoadmapStep;
use crate::market::analysis::MarketAnalysis;
use crate::models::profile::StudentProfile;

/// A step the student reported being stuck on. `attempts` counts reports
/// for the same step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blocker {
    pub step: u32,
    pub reason: String,
    pub attempts: u32,
    pub first_reported: DateTime<Utc>,
    pub last_reported: DateTime<Utc>,
}

/// Mutable per-session journey state. The "state" of the re-evaluation
/// machine is the combination of `completed_steps`, `blocked_steps`, and
/// `motivation_level` — there is no single state enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub session_id: Uuid,
    pub target_role: String,
    pub roadmap: Vec<RoadmapStep>,
    pub total_steps: u32,
    pub current_step: u32,
    pub completed_steps: Vec<u32>,
    pub blocked_steps: Vec<Blocker>,
    /// step number → hours spent.
    pub time_spent: BTreeMap<u32, f64>,
    pub start_date: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Market analysis captured when the journey started; re-evaluation
    /// compares fresh analyses against it.
    pub market_snapshot: MarketAnalysis,
    pub student_profile: StudentProfile,
    pub reroute_count: u32,
    /// In [0.1, 1.0]; drops by 0.2 per distinct active blocker.
    pub motivation_level: f64,
    /// Completed-step count at which the periodic checkpoint last fired.
    /// Keeps a multiple-of-3 checkpoint from firing twice.
    pub last_checkpoint: u32,
}

impl Journey {
    pub fn new(
        session_id: Uuid,
        target_role: String,
        roadmap: Vec<RoadmapStep>,
        market_snapshot: MarketAnalysis,
        student_profile: StudentProfile,
    ) -> Self {
        let now = Utc::now();
        let total_steps = roadmap.len() as u32;
        Journey {
            session_id,
            target_role,
            roadmap,
            total_steps,
            current_step: 1,
            completed_steps: Vec::new(),
            blocked_steps: Vec::new(),
            time_spent: BTreeMap::new(),
            start_date: now,
            last_activity: now,
            market_snapshot,
            student_profile,
            reroute_count: 0,
            motivation_level: 1.0,
            last_checkpoint: 0,
        }
    }

    pub fn estimated_completion_weeks(&self) -> u32 {
        self.roadmap.iter().map(|s| s.duration_weeks).sum()
    }

    pub fn progress_percentage(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.completed_steps.len() as f64 / self.total_steps as f64 * 100.0
    }
}

/// Injected session persistence capability. The engine never owns a
/// process-wide registry; callers fetch a journey, let the engine mutate
/// it, and put it back.
pub trait SessionStore: Send + Sync {
    fn get(&self, session_id: Uuid) -> Result<Journey, AdvisorError>;
    fn put(&self, journey: Journey);
    fn delete(&self, session_id: Uuid) -> Result<(), AdvisorError>;
}

/// Mutex-backed store for the standalone runner and tests. `update` runs a
/// whole read-modify-write sequence under the lock, which keeps blocker
/// attempt increments and motivation updates atomic per session.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<Uuid, Journey>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut Journey) -> T,
    ) -> Result<T, AdvisorError> {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let journey = sessions
            .get_mut(&session_id)
            .ok_or(AdvisorError::SessionNotFound(session_id))?;
        Ok(f(journey))
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: Uuid) -> Result<Journey, AdvisorError> {
        let sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions
            .get(&session_id)
            .cloned()
            .ok_or(AdvisorError::SessionNotFound(session_id))
    }

    fn put(&self, journey: Journey) {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.insert(journey.session_id, journey);
    }

    fn delete(&self, session_id: Uuid) -> Result<(), AdvisorError> {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or(AdvisorError::SessionNotFound(session_id))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::market::analysis::{BarrierLabel, RequiredSkills};
    use crate::models::catalog::MarketTrend;
    use crate::models::profile::{ExperienceLevel, LearningCapacity};

    fn make_market_snapshot(jobs: u64) -> MarketAnalysis {
        MarketAnalysis {
            role: "Data Analyst".to_string(),
            demand_score: 70,
            active_jobs: jobs,
            trend: MarketTrend::Stable,
            growth_rate: 5.0,
            avg_salary_range: "₹4.0-7.0 LPA".to_string(),
            entry_barrier: 0.3,
            entry_barrier_label: BarrierLabel::Low,
            required_skills: RequiredSkills {
                must_have: vec![],
                nice_to_have: vec![],
            },
            skill_match: 0.5,
            matched_skills: vec![],
            missing_skills: vec![],
            missing_skills_count: 0,
            competition_level: BarrierLabel::Low,
            freshers_accepted: true,
            estimated_time_to_job: "3 months".to_string(),
            data_source: None,
            last_updated: None,
        }
    }

    fn make_profile() -> StudentProfile {
        StudentProfile {
            technical_skills: BTreeMap::new(),
            proficiency_map: BTreeMap::new(),
            experience_level: ExperienceLevel::Beginner,
            learning_capacity: LearningCapacity::Medium,
            strength_areas: vec![],
            weakness_areas: vec![],
        }
    }

    fn make_step(number: u32) -> RoadmapStep {
        RoadmapStep {
            step_number: number,
            title: format!("Step {number}"),
            description: String::new(),
            duration_weeks: 2,
            success_metric: String::new(),
            why_important: String::new(),
            skills_covered: vec![],
            resources: vec![],
            project_details: None,
        }
    }

    fn make_journey() -> Journey {
        Journey::new(
            Uuid::new_v4(),
            "Data Analyst".to_string(),
            vec![make_step(1), make_step(2), make_step(3)],
            make_market_snapshot(1000),
            make_profile(),
        )
    }

    #[test]
    fn test_new_journey_defaults() {
        let journey = make_journey();
        assert_eq!(journey.total_steps, 3);
        assert_eq!(journey.current_step, 1);
        assert_eq!(journey.motivation_level, 1.0);
        assert_eq!(journey.estimated_completion_weeks(), 6);
        assert_eq!(journey.progress_percentage(), 0.0);
    }

    #[test]
    fn test_store_get_put_delete_round_trip() {
        let store = InMemorySessionStore::new();
        let journey = make_journey();
        let session_id = journey.session_id;

        store.put(journey);
        assert!(store.get(session_id).is_ok());
        assert!(store.delete(session_id).is_ok());
        assert!(matches!(
            store.get(session_id),
            Err(AdvisorError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_store_unknown_session_errors() {
        let store = InMemorySessionStore::new();
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.update(missing, |_| ()),
            Err(AdvisorError::SessionNotFound(_))
        ));
        assert!(store.delete(missing).is_err());
    }

    #[test]
    fn test_store_update_mutates_in_place() {
        let store = InMemorySessionStore::new();
        let journey = make_journey();
        let session_id = journey.session_id;
        store.put(journey);

        store
            .update(session_id, |j| j.completed_steps.push(1))
            .unwrap();
        store
            .update(session_id, |j| j.completed_steps.push(2))
            .unwrap();

        assert_eq!(store.get(session_id).unwrap().completed_steps, vec![1, 2]);
    }
}
