//! Symptom pattern matching for the disease-onset rule.
//!
//! Patterns are regexes so operators can extend the built-in set from
//! configuration (e.g. local spellings or additional symptoms).

use regex::Regex;
use tracing::warn;

/// Built-in symptom patterns indicating possible disease onset.
#[must_use]
pub fn default_symptom_patterns() -> Vec<String> {
    vec![r"(?i)diarrhea".to_string(), r"(?i)ruffled\s+feathers".to_string()]
}

/// Compiled matcher over the symptom pattern set.
#[derive(Debug, Clone)]
pub struct SymptomMatcher {
    regexes: Vec<Regex>,
}

impl SymptomMatcher {
    /// Compile a matcher from a pattern list.
    ///
    /// Invalid patterns are skipped with a warning; configuration
    /// validation reports them to the user before this point.
    #[must_use]
    pub fn from_patterns(patterns: &[String]) -> Self {
        let regexes = patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "Invalid symptom pattern");
                    None
                }
            })
            .collect();
        Self { regexes }
    }

    /// Whether the symptom text matches any pattern.
    #[must_use]
    pub fn matches(&self, symptoms: &str) -> bool {
        self.regexes.iter().any(|r| r.is_match(symptoms))
    }

    /// Number of compiled patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    /// Whether no patterns compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }
}

impl Default for SymptomMatcher {
    fn default() -> Self {
        Self::from_patterns(&default_symptom_patterns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_compile() {
        let matcher = SymptomMatcher::default();
        assert_eq!(matcher.len(), default_symptom_patterns().len());
        assert!(!matcher.is_empty());
    }

    #[test]
    fn test_matches_case_insensitive() {
        let matcher = SymptomMatcher::default();
        assert!(matcher.matches("Diarrhea"));
        assert!(matcher.matches("watery DIARRHEA observed"));
        assert!(matcher.matches("Ruffled  feathers and droopy wings"));
        assert!(!matcher.matches("coughing"));
    }

    #[test]
    fn test_custom_patterns() {
        let matcher = SymptomMatcher::from_patterns(&[r"(?i)swollen\s+head".to_string()]);
        assert!(matcher.matches("Swollen head syndrome"));
        assert!(!matcher.matches("diarrhea"));
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let matcher = SymptomMatcher::from_patterns(&[
            r"(?i)valid".to_string(),
            r"[invalid".to_string(),
        ]);
        assert_eq!(matcher.len(), 1);
    }

    #[test]
    fn test_empty_matcher_matches_nothing() {
        let matcher = SymptomMatcher::from_patterns(&[]);
        assert!(matcher.is_empty());
        assert!(!matcher.matches("diarrhea"));
    }
}
