#![allow(dead_code)]

// All narrator prompt constants for the guidance module.
// Prose prompts share NARRATOR_SYSTEM; the roadmap prompt enforces JSON.

/// System prompt for prose generation (explanations, justifications).
pub const NARRATOR_SYSTEM: &str = "You are an empathetic, data-driven career advisor. \
    Write concise, encouraging prose grounded in the numbers you are given. \
    Output ONLY the requested text - no headers, labels, or bullet points.";

/// System prompt for roadmap generation — enforces JSON-only output.
pub const ROADMAP_SYSTEM: &str = "You are an expert learning-path designer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Infeasibility explanation template. Replace: {desired_role}, {verdict},
/// {reasons}, {skill_match_pct}, {missing_skills}, {experience_level},
/// {active_jobs}, {entry_barrier_pct}, {time_estimate}.
pub const EXPLANATION_PROMPT_TEMPLATE: &str = r#"Generate a brief, empathetic explanation for why pursuing {desired_role} may not be the best immediate path.

VERDICT: {verdict}

KEY CHALLENGES:
{reasons}

STUDENT'S CURRENT SITUATION:
- Skill match: {skill_match_pct}%
- Missing skills: {missing_skills}
- Experience level: {experience_level}

MARKET REALITY:
- Active jobs: {active_jobs}
- Entry barrier: {entry_barrier_pct}%
- Estimated learning time: {time_estimate}

Write a SHORT (2-3 sentences) explanation that:
1. Acknowledges their goal
2. Explains the main challenge
3. Suggests there are better paths forward

Be empathetic but honest. Don't use bullet points. Output ONLY the explanation text."#;

/// Alternative-role justification template. Replace: {original_role},
/// {alternative_role}, {original_jobs}, {original_barrier_pct},
/// {original_match_pct}, {alternative_jobs}, {alternative_barrier_pct},
/// {skill_overlap_pct}, {salary_range}, {trend}, {progression_pct},
/// {experience_level}, {strength_areas}.
pub const JUSTIFICATION_PROMPT_TEMPLATE: &str = r#"Generate a brief, persuasive justification for why {alternative_role} is a better career path than {original_role} for this student.

ORIGINAL GOAL: {original_role}
- Active jobs: {original_jobs}
- Entry barrier: {original_barrier_pct}%
- Student's skill match: {original_match_pct}%

ALTERNATIVE: {alternative_role}
- Active jobs: {alternative_jobs}
- Entry barrier: {alternative_barrier_pct}%
- Student's skill match: {skill_overlap_pct}%
- Salary: {salary_range}
- Trend: {trend}
- Can lead back to {original_role}: {progression_pct}% probability

STUDENT PROFILE:
- Experience level: {experience_level}
- Strength areas: {strength_areas}

Write 3-4 sentences that:
1. Highlight key advantages (more jobs, easier entry, good pay)
2. Use specific numbers from the data
3. Show path back to original goal if possible
4. Sound encouraging and strategic (not like a downgrade)

Output ONLY the justification text, no headers or labels."#;

/// Roadmap generation template. Replace: {target_role}, {current_skills},
/// {skills_to_learn}, {duration_weeks}, {active_jobs}, {entry_barrier_pct},
/// {demand_score}, {step_count}.
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"Create a detailed learning roadmap to become a {target_role}.

CURRENT SKILLS: {current_skills}

SKILLS TO LEARN (in priority order):
{skills_to_learn}

CONSTRAINTS:
- Total duration: {duration_weeks} weeks
- Must include hands-on projects
- Each step needs clear success metrics

MARKET CONTEXT:
- Required by {active_jobs} jobs
- Entry barrier: {entry_barrier_pct}%
- Demand score: {demand_score}/100

Generate a step-by-step roadmap. For each step, provide:
1. What to learn (specific and actionable)
2. Duration in weeks
3. Success metric (how to know you've mastered it)
4. Why this step matters (brief market justification)

Output ONLY valid JSON in this exact format:
{
  "steps": [
    {
      "step_number": 1,
      "title": "Master SQL Fundamentals",
      "description": "Learn SELECT, JOIN, WHERE, GROUP BY, and basic database design",
      "duration_weeks": 3,
      "success_metric": "Complete 50 SQL problems on HackerRank, build 2 database schemas",
      "why_important": "Required by 95% of Data Analyst roles",
      "skills_covered": ["SQL"]
    }
  ]
}

Create {step_count} learning steps. Ensure logical progression (fundamentals before advanced)."#;
