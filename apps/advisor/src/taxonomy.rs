//! Skill normalization — canonical names, aliases, and the permissive fuzzy
//! match every scoring component relies on.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AdvisorError;
use crate::models::profile::SkillCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub canonical_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub category: SkillCategory,
}

/// Canonical skill names with their aliases. Loaded once; lookup only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    #[serde(default)]
    pub skills: BTreeMap<String, TaxonomyEntry>,
}

impl SkillTaxonomy {
    pub fn from_path(path: &Path) -> Result<Self, AdvisorError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Canonicalizes a raw skill name: case-insensitive canonical-name
    /// match, then alias match, then the title-cased original. Always
    /// returns a usable name; there is no failure path.
    pub fn normalize(&self, raw: &str) -> String {
        let needle = raw.trim().to_lowercase();
        for entry in self.skills.values() {
            if entry.canonical_name.to_lowercase() == needle {
                return entry.canonical_name.clone();
            }
            if entry.aliases.iter().any(|alias| alias.to_lowercase() == needle) {
                return entry.canonical_name.clone();
            }
        }
        title_case(raw.trim())
    }

    /// Fuzzy skill equality: equal after lowercasing/trimming, one name
    /// contained in the other, or both normalizing to the same canonical
    /// name. Containment is deliberately permissive — "Python" matches
    /// "Python/Java", and "Java" also matches "JavaScript". Tightening it
    /// would silently shift feasibility verdicts, so it stays as is.
    pub fn skills_match(&self, a: &str, b: &str) -> bool {
        let s1 = a.trim().to_lowercase();
        let s2 = b.trim().to_lowercase();

        if s1 == s2 {
            return true;
        }
        if s1.contains(&s2) || s2.contains(&s1) {
            return true;
        }
        self.normalize(a).eq_ignore_ascii_case(&self.normalize(b))
    }
}

/// Capitalizes the first letter of each whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_taxonomy() -> SkillTaxonomy {
        let mut skills = BTreeMap::new();
        skills.insert(
            "python".to_string(),
            TaxonomyEntry {
                canonical_name: "Python".to_string(),
                aliases: vec!["python3".to_string(), "py".to_string()],
                category: SkillCategory::Programming,
            },
        );
        skills.insert(
            "sql".to_string(),
            TaxonomyEntry {
                canonical_name: "SQL".to_string(),
                aliases: vec!["mysql".to_string(), "postgresql".to_string()],
                category: SkillCategory::Databases,
            },
        );
        SkillTaxonomy { skills }
    }

    #[test]
    fn test_normalize_canonical_case_insensitive() {
        let taxonomy = make_taxonomy();
        assert_eq!(taxonomy.normalize("PYTHON"), "Python");
        assert_eq!(taxonomy.normalize("  sql  "), "SQL");
    }

    #[test]
    fn test_normalize_alias_to_canonical() {
        let taxonomy = make_taxonomy();
        assert_eq!(taxonomy.normalize("py"), "Python");
        assert_eq!(taxonomy.normalize("PostgreSQL"), "SQL");
    }

    #[test]
    fn test_normalize_unknown_title_cases() {
        let taxonomy = make_taxonomy();
        assert_eq!(taxonomy.normalize("data engineering"), "Data Engineering");
    }

    #[test]
    fn test_match_exact_and_substring() {
        let taxonomy = make_taxonomy();
        assert!(taxonomy.skills_match("Python", "python"));
        assert!(taxonomy.skills_match("Python", "Python/Java"));
    }

    #[test]
    fn test_match_via_shared_canonical() {
        let taxonomy = make_taxonomy();
        assert!(taxonomy.skills_match("mysql", "postgresql"));
    }

    #[test]
    fn test_match_java_javascript_overmatch_is_kept() {
        // Known over-match from the containment heuristic.
        let taxonomy = make_taxonomy();
        assert!(taxonomy.skills_match("Java", "JavaScript"));
    }

    #[test]
    fn test_no_match_for_unrelated_skills() {
        let taxonomy = make_taxonomy();
        assert!(!taxonomy.skills_match("Python", "Tableau"));
    }

    #[test]
    fn test_title_case_words() {
        assert_eq!(title_case("machine learning"), "Machine Learning");
        assert_eq!(title_case("SQL"), "Sql");
    }
}
